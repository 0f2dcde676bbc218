#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub bank_simulator: BankSimulator,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct BankSimulator {
    pub url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub breaker_failure_threshold: u32,
    pub breaker_window_secs: u64,
    pub breaker_open_secs: u64,
}
