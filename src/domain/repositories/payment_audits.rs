use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::payment_audits::InsertPaymentAuditEntity;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentAuditRepository {
    async fn insert(&self, insert_audit_entity: InsertPaymentAuditEntity) -> Result<i64>;
}
