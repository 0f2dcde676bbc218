use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{error, info, warn};

use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::config::config_model::BankSimulator;

/// Outbound payload for the bank simulator: an open JSON map. The card
/// processor fills in amount, currency, card_number, expiry_date and cvv.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BankPaymentRequest {
    #[serde(flatten)]
    properties: Map<String, Value>,
}

impl BankPaymentRequest {
    pub fn add(&mut self, key: &str, value: Value) {
        self.properties.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Whatever the bank answered, untyped. Accessors cover the fields the
/// caller actually consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BankPaymentResponse {
    #[serde(flatten)]
    raw_data: Map<String, Value>,
}

impl BankPaymentResponse {
    pub fn add(&mut self, key: &str, value: Value) {
        self.raw_data.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw_data.get(key)
    }

    /// None when the field is absent or not a boolean; the processor maps
    /// that to PENDING_RECONCILIATION rather than guessing.
    pub fn authorized(&self) -> Option<bool> {
        self.raw_data.get("authorized").and_then(Value::as_bool)
    }

    pub fn indeterminate(&self) -> bool {
        self.raw_data
            .get("indeterminate")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn authorization_code(&self) -> Option<&Value> {
        self.raw_data.get("authorization_code")
    }

    pub fn error_message(&self) -> Option<&str> {
        self.raw_data.get("error_message").and_then(Value::as_str)
    }
}

enum CallFailure {
    /// Transport failure or 5xx: worth another attempt.
    Retryable(String),
    /// Anything else; retrying an identical request cannot help.
    Fatal(String),
}

/// Client for the bank simulator wrapping retries and a circuit breaker.
/// Its one call never fails: when the bank's true answer is unknown the
/// fallback marks the outcome indeterminate instead of declining, so a
/// merchant retry cannot double-charge.
pub struct BankSimulatorClient {
    http: reqwest::Client,
    url: String,
    max_attempts: u32,
    retry_backoff: Duration,
    breaker: CircuitBreaker,
}

impl BankSimulatorClient {
    pub fn new(config: &BankSimulator) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url.clone(),
            max_attempts: config.retry_max_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            breaker: CircuitBreaker::new(CircuitBreakerConfig {
                failure_threshold: config.breaker_failure_threshold,
                window: Duration::from_secs(config.breaker_window_secs),
                open_for: Duration::from_secs(config.breaker_open_secs),
            }),
        })
    }

    pub async fn process_bank_payment(&self, request: BankPaymentRequest) -> BankPaymentResponse {
        if !self.breaker.try_acquire() {
            warn!(url = %self.url, "bank simulator circuit breaker is open, short-circuiting");
            return Self::fallback("circuit breaker is open");
        }

        info!(url = %self.url, "sending request to bank simulator");

        let mut last_failure = String::new();
        let mut attempt = 0;

        while attempt < self.max_attempts {
            attempt += 1;

            match self.try_call(&request).await {
                Ok(response) => {
                    self.breaker.record_success();
                    return response;
                }
                Err(CallFailure::Retryable(cause)) => {
                    self.breaker.record_failure();
                    warn!(attempt, cause = %cause, "bank simulator call failed");
                    last_failure = cause;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_backoff * attempt).await;
                    }
                }
                Err(CallFailure::Fatal(cause)) => {
                    self.breaker.record_failure();
                    last_failure = cause;
                    break;
                }
            }
        }

        error!(
            cause = %last_failure,
            "bank simulator call failed after retries, triggering indeterminate fallback"
        );
        Self::fallback(&last_failure)
    }

    async fn try_call(
        &self,
        request: &BankPaymentRequest,
    ) -> std::result::Result<BankPaymentResponse, CallFailure> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|error| CallFailure::Retryable(error.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(CallFailure::Retryable(format!(
                "bank returned status {status}"
            )));
        }
        if !status.is_success() {
            return Err(CallFailure::Fatal(format!("bank returned status {status}")));
        }

        response
            .json::<BankPaymentResponse>()
            .await
            .map_err(|error| CallFailure::Fatal(format!("undecodable bank response: {error}")))
    }

    fn fallback(cause: &str) -> BankPaymentResponse {
        let mut response = BankPaymentResponse::default();
        response.add("authorized", Value::Bool(false));
        response.add("indeterminate", Value::Bool(true));
        response.add("error_message", Value::String(cause.to_string()));
        response
    }
}
