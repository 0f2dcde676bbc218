pub mod axum_http;
pub mod bank_simulator;
pub mod postgres;
