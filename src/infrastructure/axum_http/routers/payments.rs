use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::{
        processors::{ProcessorRegistry, card::CardPaymentProcessor},
        usecases::payments::PaymentUseCase,
    },
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            payment_audits::PaymentAuditRepository, payments::PaymentRepository,
        },
        value_objects::payments::PaymentRequestModel,
    },
    infrastructure::{
        axum_http::error_responses,
        bank_simulator::bank_client::BankSimulatorClient,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{payment_audits::PaymentAuditPostgres, payments::PaymentPostgres},
        },
    },
};

const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Result<Router> {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let audit_repository = PaymentAuditPostgres::new(Arc::clone(&db_pool));

    let bank_client = BankSimulatorClient::new(&config.bank_simulator)?;
    let card_processor = CardPaymentProcessor::new(Arc::new(bank_client));
    let registry = ProcessorRegistry::new(vec![Arc::new(card_processor)]);

    let payments_usecase = PaymentUseCase::new(
        Arc::new(payment_repository),
        Arc::new(audit_repository),
        Arc::new(registry),
    );

    Ok(Router::new()
        .route("/process", post(process_payment))
        .route("/{id}", get(get_payment_details))
        .with_state(Arc::new(payments_usecase)))
}

pub async fn process_payment<P, A>(
    State(payments_usecase): State<Arc<PaymentUseCase<P, A>>>,
    headers: HeaderMap,
    Json(request): Json<PaymentRequestModel>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    A: PaymentAuditRepository + Send + Sync + 'static,
{
    let idempotency_key = match headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        Some(key) => key.to_string(),
        None => {
            return error_responses::bad_request("X-Idempotency-Key header is required");
        }
    };

    let errors = request.validate();
    if !errors.is_empty() {
        return error_responses::validation_rejected(errors);
    }

    info!(
        payment_type = %request.payment_type(),
        amount = ?request.amount,
        currency = ?request.currency,
        %idempotency_key,
        "processing payment request"
    );

    // Run the pipeline on its own task: a merchant disconnect must not
    // abort a payment mid-flight between the bank call and the final write.
    let task = tokio::spawn(async move {
        payments_usecase
            .handle_payment(&idempotency_key, &request)
            .await
    });

    match task.await {
        Ok(Ok(response)) => (StatusCode::CREATED, Json(response)).into_response(),
        Ok(Err(payment_error)) => error_responses::payment_error_response(payment_error),
        Err(join_error) => {
            error!(error = ?join_error, "payment pipeline task failed");
            error_responses::system_error()
        }
    }
}

pub async fn get_payment_details<P, A>(
    State(payments_usecase): State<Arc<PaymentUseCase<P, A>>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    A: PaymentAuditRepository + Send + Sync + 'static,
{
    info!(%id, "fetching payment details");

    match payments_usecase.get_payment_by_id(id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(payment_error) => error_responses::payment_error_response(payment_error),
    }
}
