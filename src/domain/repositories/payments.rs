use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::payments::{InsertPaymentEntity, PaymentEntity};
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

/// Outcome of inserting a payment row. The unique constraint on
/// `idempotency_key` turns a concurrent duplicate into a replay signal
/// rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentInsertOutcome {
    Inserted(PaymentEntity),
    DuplicateIdempotencyKey,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository {
    async fn insert(&self, insert_payment_entity: InsertPaymentEntity)
    -> Result<PaymentInsertOutcome>;

    /// Moves a PENDING row to its terminal status and attaches the details
    /// bag. Rows already finalized are left untouched.
    async fn finalize(
        &self,
        id: Uuid,
        status: PaymentStatus,
        details: serde_json::Value,
    ) -> Result<PaymentEntity>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentEntity>>;

    async fn find_by_idempotency_key(&self, idempotency_key: &str)
    -> Result<Option<PaymentEntity>>;

    /// Locked variant for the replay path: waits out any contending
    /// finalizer so the row read is the latest committed state.
    async fn find_and_lock_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<PaymentEntity>>;
}
