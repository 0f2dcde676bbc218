use anyhow::anyhow;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::application::processors::ProcessorRegistry;
use crate::domain::entities::payment_audits::InsertPaymentAuditEntity;
use crate::domain::entities::payments::{InsertPaymentEntity, PaymentEntity};
use crate::domain::repositories::payment_audits::PaymentAuditRepository;
use crate::domain::repositories::payments::{PaymentInsertOutcome, PaymentRepository};
use crate::domain::value_objects::enums::audit_actions::AuditAction;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::{PaymentRequestModel, PaymentResponseModel};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Consistency error during idempotent replay for key: {0}")]
    Consistency(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::Consistency(_) | PaymentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

/// Audit payloads are scrubbed before serialization: requests still carry
/// the raw PAN and CVV, processor responses only ever hold the masked form.
enum AuditPayload<'a> {
    Request(&'a PaymentRequestModel),
    Response(&'a PaymentResponseModel),
}

pub struct PaymentUseCase<P, A>
where
    P: PaymentRepository + Send + Sync + 'static,
    A: PaymentAuditRepository + Send + Sync + 'static,
{
    payment_repo: Arc<P>,
    audit_repo: Arc<A>,
    registry: Arc<ProcessorRegistry>,
}

impl<P, A> PaymentUseCase<P, A>
where
    P: PaymentRepository + Send + Sync + 'static,
    A: PaymentAuditRepository + Send + Sync + 'static,
{
    pub fn new(payment_repo: Arc<P>, audit_repo: Arc<A>, registry: Arc<ProcessorRegistry>) -> Self {
        Self {
            payment_repo,
            audit_repo,
            registry,
        }
    }

    pub async fn handle_payment(
        &self,
        idempotency_key: &str,
        request: &PaymentRequestModel,
    ) -> PaymentResult<PaymentResponseModel> {
        self.save_audit(
            None,
            idempotency_key,
            AuditAction::RequestReceived,
            AuditPayload::Request(request),
        )
        .await;

        if self
            .payment_repo
            .find_by_idempotency_key(idempotency_key)
            .await?
            .is_some()
        {
            info!(%idempotency_key, "idempotency conflict, replaying");
            return self.find_and_map(idempotency_key).await;
        }

        let insert_payment_entity = InsertPaymentEntity {
            amount: request.amount(),
            currency: request.currency().to_string(),
            status: PaymentStatus::Pending.to_string(),
            idempotency_key: idempotency_key.to_string(),
        };

        let payment = match self.payment_repo.insert(insert_payment_entity).await? {
            PaymentInsertOutcome::Inserted(payment) => payment,
            // A concurrent request with the same key won the insert race;
            // its row is the authoritative one.
            PaymentInsertOutcome::DuplicateIdempotencyKey => {
                info!(%idempotency_key, "idempotency conflict on insert, replaying");
                return self.find_and_map(idempotency_key).await;
            }
        };

        self.execute_and_finalize(payment, request).await
    }

    /// Replay path: a locked re-read so a finalizing writer on the same row
    /// commits before we project it. A miss here means the row we just
    /// observed vanished, which is corruption, not a caller error.
    pub async fn find_and_map(&self, idempotency_key: &str) -> PaymentResult<PaymentResponseModel> {
        match self
            .payment_repo
            .find_and_lock_by_idempotency_key(idempotency_key)
            .await?
        {
            Some(payment) => Ok(self.map_to_response(&payment)),
            None => Err(PaymentError::Consistency(idempotency_key.to_string())),
        }
    }

    pub async fn get_payment_by_id(&self, id: Uuid) -> PaymentResult<PaymentResponseModel> {
        info!(%id, "fetching payment record");
        match self.payment_repo.find_by_id(id).await? {
            Some(payment) => Ok(self.map_to_response(&payment)),
            None => Err(PaymentError::NotFound(format!(
                "Payment not found for ID: {id}"
            ))),
        }
    }

    async fn execute_and_finalize(
        &self,
        payment: PaymentEntity,
        request: &PaymentRequestModel,
    ) -> PaymentResult<PaymentResponseModel> {
        let payment_type = request.payment_type();
        let processor = self.registry.select(&payment_type).ok_or_else(|| {
            PaymentError::InvalidArgument(format!("Unsupported payment type: {payment_type}"))
        })?;

        let mut processor_response = processor.process(request).await?;

        let status = processor_response
            .status
            .ok_or_else(|| anyhow!("processor returned a response without a status"))?;

        // Merge the message into the details bag so the projection can lift
        // it back out of the persisted row.
        if let Some(message) = processor_response.message.clone() {
            processor_response.add("message", Value::String(message));
        }

        let saved_payment = self
            .payment_repo
            .finalize(
                payment.id,
                status,
                Value::Object(processor_response.details.clone()),
            )
            .await?;

        self.save_audit(
            Some(saved_payment.id),
            &saved_payment.idempotency_key,
            AuditAction::ProcessCompleted,
            AuditPayload::Response(&processor_response),
        )
        .await;

        Ok(self.map_to_response(&saved_payment))
    }

    fn map_to_response(&self, entity: &PaymentEntity) -> PaymentResponseModel {
        let mut response = PaymentResponseModel::default();
        response.payment_id = Some(entity.id);
        response.status = PaymentStatus::from_str(&entity.status);
        response.add("amount", json!(entity.amount));
        response.add("currency", json!(entity.currency));

        if let Some(Value::Object(details)) = &entity.details {
            let payment_type = details
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");

            if let Some(processor) = self.registry.select(payment_type) {
                processor.map_details_to_response(details, &mut response);
            }

            if let Some(message) = details.get("message").and_then(Value::as_str) {
                response.message = Some(message.to_string());
            }
        }

        response
    }

    /// Audit writes must never fail a payment: a user-visible error after a
    /// successful bank authorization would be worse than a missing audit row.
    async fn save_audit(
        &self,
        payment_id: Option<Uuid>,
        idempotency_key: &str,
        action: AuditAction,
        payload: AuditPayload<'_>,
    ) {
        let result = async {
            let payload = scrub_and_serialize(&payload)?;
            self.audit_repo
                .insert(InsertPaymentAuditEntity {
                    payment_id,
                    idempotency_key: idempotency_key.to_string(),
                    action: action.to_string(),
                    payload,
                })
                .await?;
            anyhow::Ok(())
        }
        .await;

        if let Err(audit_error) = result {
            error!(%idempotency_key, error = ?audit_error, "critical audit failure");
        }
    }
}

fn scrub_and_serialize(payload: &AuditPayload<'_>) -> anyhow::Result<String> {
    match payload {
        AuditPayload::Request(request) => {
            let mut data = request.data.clone();
            if data.contains_key("card_number") {
                data.insert("card_number".to_string(), Value::String("****".to_string()));
            }
            if data.contains_key("cvv") {
                data.insert("cvv".to_string(), Value::String("***".to_string()));
            }

            let for_serialization = json!({
                "amount": request.amount,
                "currency": request.currency,
                "data": data,
            });
            Ok(serde_json::to_string(&for_serialization)?)
        }
        // Processor responses only carry the masked card number.
        AuditPayload::Response(response) => Ok(serde_json::to_string(response)?),
    }
}
