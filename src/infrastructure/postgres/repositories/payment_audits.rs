use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into};
use std::sync::Arc;

use crate::domain::entities::payment_audits::InsertPaymentAuditEntity;
use crate::domain::repositories::payment_audits::PaymentAuditRepository;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, schema::payment_audit_logs,
};

pub struct PaymentAuditPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentAuditPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentAuditRepository for PaymentAuditPostgres {
    async fn insert(&self, insert_audit_entity: InsertPaymentAuditEntity) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let audit_id = insert_into(payment_audit_logs::table)
            .values(&insert_audit_entity)
            .returning(payment_audit_logs::id)
            .get_result::<i64>(&mut conn)?;

        Ok(audit_id)
    }
}
