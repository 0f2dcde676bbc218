use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, warn};

use crate::application::usecases::payments::PaymentError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RejectedBody {
    pub status: String,
    pub message: String,
    pub errors: HashMap<String, String>,
}

pub fn validation_rejected(errors: HashMap<String, String>) -> Response {
    warn!(?errors, "validation failed for request");
    (
        StatusCode::BAD_REQUEST,
        Json(RejectedBody {
            status: "REJECTED".to_string(),
            message: "Validation failed".to_string(),
            errors,
        }),
    )
        .into_response()
}

pub fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: "BAD_REQUEST".to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

pub fn system_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "SYSTEM_ERROR".to_string(),
            message: "An unexpected error occurred".to_string(),
        }),
    )
        .into_response()
}

/// Maps usecase errors to the wire shapes. Internal detail never reaches
/// the merchant.
pub fn payment_error_response(payment_error: PaymentError) -> Response {
    match &payment_error {
        PaymentError::InvalidArgument(message) => {
            warn!("Bad request: {}", message);
            bad_request(message)
        }
        PaymentError::NotFound(message) => {
            warn!("Resource not found: {}", message);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: "NOT_FOUND".to_string(),
                    message: message.to_string(),
                }),
            )
                .into_response()
        }
        PaymentError::Consistency(_) | PaymentError::Internal(_) => {
            error!(error = ?payment_error, "Unexpected system error");
            system_error()
        }
    }
}
