use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::payments::{InsertPaymentEntity, PaymentEntity};
use crate::domain::repositories::payments::{PaymentInsertOutcome, PaymentRepository};
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payments};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn insert(
        &self,
        insert_payment_entity: InsertPaymentEntity,
    ) -> Result<PaymentInsertOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(payments::table)
            .values(&insert_payment_entity)
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn);

        match result {
            Ok(payment) => Ok(PaymentInsertOutcome::Inserted(payment)),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Ok(PaymentInsertOutcome::DuplicateIdempotencyKey)
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn finalize(
        &self,
        id: Uuid,
        status: PaymentStatus,
        details: serde_json::Value,
    ) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The PENDING filter makes the transition one-way: a row that
        // already reached a terminal status is never rewritten.
        let payment = update(
            payments::table
                .filter(payments::id.eq(id))
                .filter(payments::status.eq(PaymentStatus::Pending.to_string())),
        )
        .set((
            payments::status.eq(status.to_string()),
            payments::details.eq(Some(details)),
            payments::updated_at.eq(Utc::now()),
        ))
        .returning(PaymentEntity::as_returning())
        .get_result::<PaymentEntity>(&mut conn)?;

        Ok(payment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::id.eq(id))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::idempotency_key.eq(idempotency_key))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn find_and_lock_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = conn.build_transaction().serializable().run(|conn| {
            payments::table
                .filter(payments::idempotency_key.eq(idempotency_key))
                .for_update()
                .select(PaymentEntity::as_select())
                .first::<PaymentEntity>(conn)
                .optional()
        })?;

        Ok(payment)
    }
}
