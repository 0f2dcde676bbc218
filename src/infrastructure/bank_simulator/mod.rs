pub mod bank_client;
pub mod circuit_breaker;
