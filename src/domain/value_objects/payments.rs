use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::enums::payment_statuses::PaymentStatus;

/// Incoming payment request: typed core fields plus an open bag that keeps
/// every extra key the merchant sent (card fields, processor-specific data).
/// Core fields stay `Option` so a missing value surfaces through `validate`
/// as a field error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequestModel {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl PaymentRequestModel {
    pub fn amount(&self) -> i64 {
        self.amount.unwrap_or_default()
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn payment_type(&self) -> String {
        match self.data.get("type") {
            Some(Value::String(payment_type)) => payment_type.clone(),
            Some(value) => value.to_string(),
            None => "UNKNOWN".to_string(),
        }
    }

    /// Body-schema validation. Field-level domain rules (card number, CVV,
    /// expiry) belong to the processor, not here.
    pub fn validate(&self) -> HashMap<String, String> {
        let mut errors = HashMap::new();

        match self.amount {
            None => {
                errors.insert("amount".to_string(), "Amount is required".to_string());
            }
            Some(amount) if amount <= 0 => {
                errors.insert(
                    "amount".to_string(),
                    "Amount must be greater than zero".to_string(),
                );
            }
            _ => {}
        }

        match &self.currency {
            Some(currency) if !currency.trim().is_empty() => {}
            _ => {
                errors.insert("currency".to_string(), "Currency is required".to_string());
            }
        }

        errors
    }
}

/// Payment response in two roles: the processor's full internal result
/// (status, message and the complete details bag) and the merchant-facing
/// projection, where only the fields added by `map_to_response` survive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentResponseModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl PaymentResponseModel {
    pub fn add(&mut self, key: &str, value: Value) {
        self.details.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card_request_json() -> Value {
        json!({
            "amount": 1000,
            "currency": "USD",
            "type": "CARD",
            "card_number": "4234567890123456",
            "expiry_month": 12,
            "expiry_year": 2030,
            "cvv": "123",
            "merchant_reference": "order-42"
        })
    }

    #[test]
    fn test_extra_keys_are_kept_in_the_bag() {
        let request: PaymentRequestModel = serde_json::from_value(card_request_json()).unwrap();

        assert_eq!(request.amount(), 1000);
        assert_eq!(request.currency(), "USD");
        assert_eq!(request.payment_type(), "CARD");
        assert_eq!(request.get("card_number"), Some(&json!("4234567890123456")));
        assert_eq!(request.get("merchant_reference"), Some(&json!("order-42")));
        assert!(request.get("amount").is_none());
    }

    #[test]
    fn test_payment_type_defaults_to_unknown() {
        let request: PaymentRequestModel =
            serde_json::from_value(json!({"amount": 100, "currency": "USD"})).unwrap();

        assert_eq!(request.payment_type(), "UNKNOWN");
    }

    #[test]
    fn test_validate_rejects_missing_and_non_positive_amount() {
        let request: PaymentRequestModel =
            serde_json::from_value(json!({"currency": "USD"})).unwrap();
        let errors = request.validate();
        assert_eq!(errors.get("amount").map(String::as_str), Some("Amount is required"));

        let request: PaymentRequestModel =
            serde_json::from_value(json!({"amount": 0, "currency": "USD"})).unwrap();
        let errors = request.validate();
        assert_eq!(
            errors.get("amount").map(String::as_str),
            Some("Amount must be greater than zero")
        );
    }

    #[test]
    fn test_validate_rejects_missing_or_blank_currency() {
        let request: PaymentRequestModel = serde_json::from_value(json!({"amount": 100})).unwrap();
        let errors = request.validate();
        assert_eq!(
            errors.get("currency").map(String::as_str),
            Some("Currency is required")
        );

        let request: PaymentRequestModel =
            serde_json::from_value(json!({"amount": 100, "currency": "  "})).unwrap();
        assert!(request.validate().contains_key("currency"));
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        let request: PaymentRequestModel = serde_json::from_value(card_request_json()).unwrap();
        assert!(request.validate().is_empty());
    }

    #[test]
    fn test_response_serialization_skips_absent_core_fields() {
        let mut response = PaymentResponseModel::default();
        response.status = Some(PaymentStatus::Authorized);
        response.add("amount", json!(1000));

        let serialized = serde_json::to_value(&response).unwrap();

        assert_eq!(serialized.get("status"), Some(&json!("AUTHORIZED")));
        assert_eq!(serialized.get("amount"), Some(&json!(1000)));
        assert!(serialized.get("payment_id").is_none());
        assert!(serialized.get("message").is_none());
    }
}
