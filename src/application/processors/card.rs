use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde_json::{Map, Value, json};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::info;

use super::PaymentProcessor;
use crate::application::usecases::payments::{PaymentError, PaymentResult};
use crate::domain::value_objects::enums::card_types::CardType;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::{PaymentRequestModel, PaymentResponseModel};
use crate::infrastructure::bank_simulator::bank_client::{
    BankPaymentRequest, BankPaymentResponse, BankSimulatorClient,
};

const SUPPORTED_CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BankGateway: Send + Sync {
    async fn process_bank_payment(&self, request: BankPaymentRequest) -> BankPaymentResponse;
}

#[async_trait]
impl BankGateway for BankSimulatorClient {
    async fn process_bank_payment(&self, request: BankPaymentRequest) -> BankPaymentResponse {
        self.process_bank_payment(request).await
    }
}

/// Card fields once validation has passed.
struct ValidCardDetails {
    card_number: String,
    cvv: String,
    expiry_month: i64,
    expiry_year: i64,
}

pub struct CardPaymentProcessor<B>
where
    B: BankGateway + 'static,
{
    bank_client: Arc<B>,
}

impl<B> CardPaymentProcessor<B>
where
    B: BankGateway + 'static,
{
    pub fn new(bank_client: Arc<B>) -> Self {
        Self { bank_client }
    }

    fn validate(&self, request: &PaymentRequestModel) -> PaymentResult<ValidCardDetails> {
        let currency = request.currency();
        if !SUPPORTED_CURRENCIES.contains(&currency) {
            return Err(PaymentError::InvalidArgument(format!(
                "Unsupported currency: {}. We only support {}",
                currency,
                SUPPORTED_CURRENCIES.join(", ")
            )));
        }

        let card_number = match request.get("card_number") {
            Some(value) => field_as_string(value).unwrap_or_default(),
            None => {
                return Err(PaymentError::InvalidArgument(
                    "Card number is required.".to_string(),
                ));
            }
        };
        if !digits_of_length(&card_number, 14..=19) {
            return Err(PaymentError::InvalidArgument(
                "Card number must be 14-19 numeric characters long.".to_string(),
            ));
        }

        let cvv = match request.get("cvv") {
            Some(value) => field_as_string(value).unwrap_or_default(),
            None => return Err(PaymentError::InvalidArgument("CVV is required.".to_string())),
        };
        if !digits_of_length(&cvv, 3..=4) {
            return Err(PaymentError::InvalidArgument(
                "CVV must be 3-4 numeric characters long.".to_string(),
            ));
        }

        let (month_value, year_value) =
            match (request.get("expiry_month"), request.get("expiry_year")) {
                (Some(month), Some(year)) => (month, year),
                _ => {
                    return Err(PaymentError::InvalidArgument(
                        "Expiry month and year are required.".to_string(),
                    ));
                }
            };

        let (Some(expiry_month), Some(expiry_year)) =
            (field_as_i64(month_value), field_as_i64(year_value))
        else {
            return Err(PaymentError::InvalidArgument(
                "Expiry month and year must be numbers.".to_string(),
            ));
        };

        if !(1..=12).contains(&expiry_month) {
            return Err(PaymentError::InvalidArgument(
                "Expiry month must be between 1 and 12.".to_string(),
            ));
        }

        let now = Utc::now();
        let (current_year, current_month) = (i64::from(now.year()), i64::from(now.month()));
        if expiry_year < current_year
            || (expiry_year == current_year && expiry_month < current_month)
        {
            return Err(PaymentError::InvalidArgument(
                "Card expiry date must be in the future.".to_string(),
            ));
        }

        Ok(ValidCardDetails {
            card_number,
            cvv,
            expiry_month,
            expiry_year,
        })
    }
}

#[async_trait]
impl<B> PaymentProcessor for CardPaymentProcessor<B>
where
    B: BankGateway + 'static,
{
    fn supports(&self, payment_type: &str) -> bool {
        payment_type.eq_ignore_ascii_case("CARD")
    }

    async fn process(&self, request: &PaymentRequestModel) -> PaymentResult<PaymentResponseModel> {
        info!(
            amount = request.amount(),
            currency = %request.currency(),
            "processing CARD payment"
        );

        let card = self.validate(request)?;

        let mut bank_request = BankPaymentRequest::default();
        bank_request.add("amount", json!(request.amount()));
        bank_request.add("currency", json!(request.currency()));
        bank_request.add("card_number", json!(card.card_number));
        bank_request.add(
            "expiry_date",
            json!(format!("{:02}/{}", card.expiry_month, card.expiry_year)),
        );
        bank_request.add("cvv", json!(card.cvv));

        let bank_response = self.bank_client.process_bank_payment(bank_request).await;

        // Indeterminate if the bank flagged a timeout, or answered without
        // saying whether it authorized. Neither may be reported as declined.
        let is_timeout = bank_response.indeterminate();
        let authorized_value = bank_response.get("authorized").cloned();
        let is_indeterminate = is_timeout || authorized_value.is_none();
        let is_authorized = matches!(authorized_value, Some(Value::Bool(true)));

        let (status, message) = if is_indeterminate {
            let message = if is_timeout {
                "Bank timeout"
            } else {
                "Malformed bank response"
            };
            (PaymentStatus::PendingReconciliation, message)
        } else if is_authorized {
            (PaymentStatus::Authorized, "Success")
        } else {
            (PaymentStatus::Declined, "Declined")
        };

        let mut response = PaymentResponseModel::default();
        response.status = Some(status);
        response.message = Some(message.to_string());
        response.add("type", json!("CARD"));
        response.add(
            "masked_card_number",
            json!(mask_card_number(&card.card_number)),
        );
        response.add(
            "card_type",
            json!(CardType::detect(&card.card_number).to_string()),
        );
        response.add("expiry_month", json!(card.expiry_month));
        response.add("expiry_year", json!(card.expiry_year));
        response.add("amount", json!(request.amount()));
        response.add("currency", json!(request.currency()));
        if let Some(authorization_code) = bank_response.authorization_code() {
            response.add("authorization_code", authorization_code.clone());
        }

        Ok(response)
    }

    fn map_details_to_response(
        &self,
        details: &Map<String, Value>,
        response: &mut PaymentResponseModel,
    ) {
        let masked_card = details
            .get("masked_card_number")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if masked_card.len() >= 4 {
            if let Some(last_four) = masked_card.get(masked_card.len() - 4..) {
                response.add("last_four_card_digits", json!(last_four));
            }
        }

        if let Some(expiry_month) = details.get("expiry_month") {
            response.add("expiry_month", expiry_month.clone());
        }
        if let Some(expiry_year) = details.get("expiry_year") {
            response.add("expiry_year", expiry_year.clone());
        }

        // Everything else in the bag (type, card_type, masked_card_number,
        // authorization_code) stays out of the merchant response.
    }
}

fn digits_of_length(value: &str, length: RangeInclusive<usize>) -> bool {
    length.contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

fn field_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn field_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

fn mask_card_number(pan: &str) -> String {
    if pan.len() < 4 {
        return "****".to_string();
    }
    match pan.get(pan.len() - 4..) {
        Some(last_four) => format!("**** **** **** {}", last_four),
        None => "****".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor_with(bank: MockBankGateway) -> CardPaymentProcessor<MockBankGateway> {
        CardPaymentProcessor::new(Arc::new(bank))
    }

    fn bank_response(body: Value) -> BankPaymentResponse {
        serde_json::from_value(body).expect("bank response should deserialize")
    }

    fn valid_request() -> PaymentRequestModel {
        let expiry_year = Utc::now().year() + 5;
        serde_json::from_value(json!({
            "amount": 1000,
            "currency": "USD",
            "type": "CARD",
            "card_number": "4234567890123456",
            "expiry_month": 12,
            "expiry_year": expiry_year,
            "cvv": "123"
        }))
        .unwrap()
    }

    fn request_with(key: &str, value: Value) -> PaymentRequestModel {
        let mut request = valid_request();
        request.data.insert(key.to_string(), value);
        request
    }

    fn request_without(key: &str) -> PaymentRequestModel {
        let mut request = valid_request();
        request.data.remove(key);
        request
    }

    fn expect_invalid_argument(
        result: PaymentResult<PaymentResponseModel>,
        expected_message: &str,
    ) {
        match result {
            Err(PaymentError::InvalidArgument(message)) => assert_eq!(message, expected_message),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_supports_card_type_case_insensitively() {
        let processor = processor_with(MockBankGateway::new());

        assert!(processor.supports("CARD"));
        assert!(processor.supports("card"));
        assert!(!processor.supports("WALLET"));
    }

    #[tokio::test]
    async fn test_authorized_bank_response_maps_to_authorized() {
        let mut bank = MockBankGateway::new();
        bank.expect_process_bank_payment()
            .withf(|request| {
                request.get("card_number") == Some(&json!("4234567890123456"))
                    && request.get("cvv") == Some(&json!("123"))
                    && request.get("expiry_date")
                        == Some(&json!(format!("12/{}", Utc::now().year() + 5)))
            })
            .times(1)
            .returning(|_| {
                bank_response(json!({
                    "authorized": true,
                    "authorization_code": "4cfc3a33-54e8"
                }))
            });

        let response = processor_with(bank).process(&valid_request()).await.unwrap();

        assert_eq!(response.status, Some(PaymentStatus::Authorized));
        assert_eq!(response.message.as_deref(), Some("Success"));
        assert_eq!(
            response.get("masked_card_number"),
            Some(&json!("**** **** **** 3456"))
        );
        assert_eq!(response.get("card_type"), Some(&json!("VISA")));
        assert_eq!(response.get("type"), Some(&json!("CARD")));
        assert_eq!(response.get("amount"), Some(&json!(1000)));
        assert_eq!(response.get("currency"), Some(&json!("USD")));
        assert_eq!(
            response.get("authorization_code"),
            Some(&json!("4cfc3a33-54e8"))
        );
    }

    #[tokio::test]
    async fn test_unauthorized_bank_response_maps_to_declined() {
        let mut bank = MockBankGateway::new();
        bank.expect_process_bank_payment()
            .times(1)
            .returning(|_| bank_response(json!({"authorized": false})));

        let response = processor_with(bank).process(&valid_request()).await.unwrap();

        assert_eq!(response.status, Some(PaymentStatus::Declined));
        assert_eq!(response.message.as_deref(), Some("Declined"));
        assert!(response.get("authorization_code").is_none());
    }

    #[tokio::test]
    async fn test_malformed_bank_response_maps_to_pending_reconciliation() {
        let mut bank = MockBankGateway::new();
        bank.expect_process_bank_payment()
            .times(1)
            .returning(|_| bank_response(json!({})));

        let response = processor_with(bank).process(&valid_request()).await.unwrap();

        assert_eq!(response.status, Some(PaymentStatus::PendingReconciliation));
        assert_eq!(response.message.as_deref(), Some("Malformed bank response"));
    }

    #[tokio::test]
    async fn test_indeterminate_bank_response_maps_to_pending_reconciliation() {
        let mut bank = MockBankGateway::new();
        bank.expect_process_bank_payment().times(1).returning(|_| {
            bank_response(json!({
                "authorized": false,
                "indeterminate": true,
                "error_message": "read timed out"
            }))
        });

        let response = processor_with(bank).process(&valid_request()).await.unwrap();

        assert_eq!(response.status, Some(PaymentStatus::PendingReconciliation));
        assert_eq!(response.message.as_deref(), Some("Bank timeout"));
    }

    #[tokio::test]
    async fn test_mastercard_detection_from_leading_digit() {
        let mut bank = MockBankGateway::new();
        bank.expect_process_bank_payment()
            .times(1)
            .returning(|_| bank_response(json!({"authorized": true})));

        let request = request_with("card_number", json!("5234567890123456"));
        let response = processor_with(bank).process(&request).await.unwrap();

        assert_eq!(response.get("card_type"), Some(&json!("MASTERCARD")));
    }

    #[tokio::test]
    async fn test_rejects_unsupported_currency_without_calling_bank() {
        let mut request = valid_request();
        request.currency = Some("THB".to_string());

        let result = processor_with(MockBankGateway::new()).process(&request).await;

        expect_invalid_argument(
            result,
            "Unsupported currency: THB. We only support USD, EUR, GBP",
        );
    }

    #[tokio::test]
    async fn test_rejects_missing_card_number() {
        let result = processor_with(MockBankGateway::new())
            .process(&request_without("card_number"))
            .await;

        expect_invalid_argument(result, "Card number is required.");
    }

    #[tokio::test]
    async fn test_rejects_short_card_number() {
        let result = processor_with(MockBankGateway::new())
            .process(&request_with("card_number", json!("123")))
            .await;

        expect_invalid_argument(result, "Card number must be 14-19 numeric characters long.");
    }

    #[tokio::test]
    async fn test_rejects_non_numeric_card_number() {
        let result = processor_with(MockBankGateway::new())
            .process(&request_with("card_number", json!("42345678901234ab")))
            .await;

        expect_invalid_argument(result, "Card number must be 14-19 numeric characters long.");
    }

    #[tokio::test]
    async fn test_rejects_missing_cvv() {
        let result = processor_with(MockBankGateway::new())
            .process(&request_without("cvv"))
            .await;

        expect_invalid_argument(result, "CVV is required.");
    }

    #[tokio::test]
    async fn test_rejects_cvv_of_wrong_length() {
        let result = processor_with(MockBankGateway::new())
            .process(&request_with("cvv", json!("12345")))
            .await;

        expect_invalid_argument(result, "CVV must be 3-4 numeric characters long.");
    }

    #[tokio::test]
    async fn test_rejects_non_numeric_cvv() {
        let result = processor_with(MockBankGateway::new())
            .process(&request_with("cvv", json!("12a")))
            .await;

        expect_invalid_argument(result, "CVV must be 3-4 numeric characters long.");
    }

    #[tokio::test]
    async fn test_rejects_missing_expiry_month() {
        let result = processor_with(MockBankGateway::new())
            .process(&request_without("expiry_month"))
            .await;

        expect_invalid_argument(result, "Expiry month and year are required.");
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_expiry_month() {
        let result = processor_with(MockBankGateway::new())
            .process(&request_with("expiry_month", json!(13)))
            .await;

        expect_invalid_argument(result, "Expiry month must be between 1 and 12.");
    }

    #[tokio::test]
    async fn test_rejects_non_numeric_expiry() {
        let result = processor_with(MockBankGateway::new())
            .process(&request_with("expiry_year", json!("soon")))
            .await;

        expect_invalid_argument(result, "Expiry month and year must be numbers.");
    }

    #[tokio::test]
    async fn test_rejects_expiry_in_the_past() {
        let mut request = request_with("expiry_year", json!(Utc::now().year() - 1));
        request.data.insert("expiry_month".to_string(), json!(1));

        let result = processor_with(MockBankGateway::new()).process(&request).await;

        expect_invalid_argument(result, "Card expiry date must be in the future.");
    }

    #[tokio::test]
    async fn test_accepts_numeric_string_expiry_fields() {
        let mut bank = MockBankGateway::new();
        bank.expect_process_bank_payment()
            .withf(|request| {
                request.get("expiry_date") == Some(&json!(format!("06/{}", Utc::now().year() + 2)))
            })
            .times(1)
            .returning(|_| bank_response(json!({"authorized": true})));

        let mut request = request_with("expiry_month", json!("6"));
        request.data.insert(
            "expiry_year".to_string(),
            json!((Utc::now().year() + 2).to_string()),
        );

        let response = processor_with(bank).process(&request).await.unwrap();
        assert_eq!(response.status, Some(PaymentStatus::Authorized));
    }

    #[test]
    fn test_map_details_exposes_only_merchant_safe_fields() {
        let processor = processor_with(MockBankGateway::new());
        let details: Map<String, Value> = serde_json::from_value(json!({
            "type": "CARD",
            "card_type": "VISA",
            "masked_card_number": "**** **** **** 3456",
            "authorization_code": "4cfc3a33-54e8",
            "expiry_month": 12,
            "expiry_year": 2030,
            "message": "Success"
        }))
        .unwrap();

        let mut response = PaymentResponseModel::default();
        processor.map_details_to_response(&details, &mut response);

        assert_eq!(response.get("last_four_card_digits"), Some(&json!("3456")));
        assert_eq!(response.get("expiry_month"), Some(&json!(12)));
        assert_eq!(response.get("expiry_year"), Some(&json!(2030)));
        assert!(response.get("masked_card_number").is_none());
        assert!(response.get("card_type").is_none());
        assert!(response.get("type").is_none());
        assert!(response.get("authorization_code").is_none());
    }

    #[test]
    fn test_map_details_skips_last_four_when_mask_is_short() {
        let processor = processor_with(MockBankGateway::new());
        let details: Map<String, Value> =
            serde_json::from_value(json!({"masked_card_number": "***"})).unwrap();

        let mut response = PaymentResponseModel::default();
        processor.map_details_to_response(&details, &mut response);

        assert!(response.get("last_four_card_digits").is_none());
    }

    #[test]
    fn test_mask_card_number_keeps_last_four() {
        assert_eq!(mask_card_number("4234567890123456"), "**** **** **** 3456");
        assert_eq!(mask_card_number("123"), "****");
    }
}
