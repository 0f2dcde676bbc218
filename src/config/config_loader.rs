use super::config_model::{BankSimulator, Database, DotEnvyConfig, Server};
use anyhow::Result;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let bank_simulator = BankSimulator {
        url: std::env::var("BANK_SIMULATOR_URL").expect("BANK_SIMULATOR_URL is invalid"),
        connect_timeout_secs: std::env::var("BANK_SIMULATOR_CONNECT_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(2),
        read_timeout_secs: std::env::var("BANK_SIMULATOR_READ_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(5),
        retry_max_attempts: std::env::var("BANK_SIMULATOR_RETRY_MAX_ATTEMPTS")
            .ok()
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(3),
        retry_backoff_ms: std::env::var("BANK_SIMULATOR_RETRY_BACKOFF_MS")
            .ok()
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(200),
        breaker_failure_threshold: std::env::var("BANK_SIMULATOR_BREAKER_FAILURE_THRESHOLD")
            .ok()
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(5),
        breaker_window_secs: std::env::var("BANK_SIMULATOR_BREAKER_WINDOW_SECS")
            .ok()
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(30),
        breaker_open_secs: std::env::var("BANK_SIMULATOR_BREAKER_OPEN_SECS")
            .ok()
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(10),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        bank_simulator,
    })
}
