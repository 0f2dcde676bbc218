pub mod card;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::application::usecases::payments::PaymentResult;
use crate::domain::value_objects::payments::{PaymentRequestModel, PaymentResponseModel};

/// Capability record for one payment type: whether it handles a declared
/// type, how to execute a payment, and how to project persisted details
/// back into a merchant-safe response.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    fn supports(&self, payment_type: &str) -> bool;

    async fn process(&self, request: &PaymentRequestModel) -> PaymentResult<PaymentResponseModel>;

    fn map_details_to_response(
        &self,
        details: &Map<String, Value>,
        response: &mut PaymentResponseModel,
    );
}

/// Ordered list of processors; the first one claiming a type wins.
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn PaymentProcessor>>,
}

impl ProcessorRegistry {
    pub fn new(processors: Vec<Arc<dyn PaymentProcessor>>) -> Self {
        Self { processors }
    }

    pub fn select(&self, payment_type: &str) -> Option<Arc<dyn PaymentProcessor>> {
        self.processors
            .iter()
            .find(|processor| processor.supports(payment_type))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTypeProcessor {
        payment_type: &'static str,
        label: &'static str,
    }

    #[async_trait]
    impl PaymentProcessor for FixedTypeProcessor {
        fn supports(&self, payment_type: &str) -> bool {
            payment_type.eq_ignore_ascii_case(self.payment_type)
        }

        async fn process(
            &self,
            _request: &PaymentRequestModel,
        ) -> PaymentResult<PaymentResponseModel> {
            Ok(PaymentResponseModel::default())
        }

        fn map_details_to_response(
            &self,
            _details: &Map<String, Value>,
            response: &mut PaymentResponseModel,
        ) {
            response.add("handled_by", Value::String(self.label.to_string()));
        }
    }

    #[test]
    fn test_select_returns_first_supporting_processor() {
        let registry = ProcessorRegistry::new(vec![
            Arc::new(FixedTypeProcessor {
                payment_type: "CARD",
                label: "card-first",
            }),
            Arc::new(FixedTypeProcessor {
                payment_type: "CARD",
                label: "card-second",
            }),
        ]);

        let processor = registry.select("card").expect("CARD should match");
        let mut response = PaymentResponseModel::default();
        processor.map_details_to_response(&Map::new(), &mut response);
        assert_eq!(response.get("handled_by"), Some(&Value::String("card-first".into())));
    }

    #[test]
    fn test_select_returns_none_for_unknown_type() {
        let registry = ProcessorRegistry::new(vec![Arc::new(FixedTypeProcessor {
            payment_type: "CARD",
            label: "card",
        })]);

        assert!(registry.select("WALLET").is_none());
    }
}
