use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::payment_audit_logs;

/// Append-only. `payment_id` is nullable because the REQUEST_RECEIVED audit
/// is written before the payment row exists. `payload` is the already
/// scrubbed JSON string; the insert timestamp comes from the database.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = payment_audit_logs)]
pub struct InsertPaymentAuditEntity {
    pub payment_id: Option<Uuid>,
    pub idempotency_key: String,
    pub action: String,
    pub payload: String,
}
