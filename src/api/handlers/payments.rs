use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{Payment, PlanAttribution, RecordPaymentRequest},
    error::{AppError, Result},
    repository::PaymentRepository,
    service::PaymentResult,
};

#[derive(Debug, Deserialize)]
pub struct ListRecentParams {
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    20
}

pub async fn record(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResult>)> {
    let result = state
        .service_context
        .payment_service
        .record_payment(member_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Payment>> {
    let payment = state
        .service_context
        .payment_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    Ok(Json(payment))
}

pub async fn list_recent(
    State(state): State<AppState>,
    Query(params): Query<ListRecentParams>,
) -> Result<Json<Vec<Payment>>> {
    let payments = state
        .service_context
        .payment_repo
        .list_recent(params.limit)
        .await?;

    Ok(Json(payments))
}

#[derive(Debug, Serialize)]
pub struct AttributionResponse {
    payment_id: Uuid,
    attribution: PlanAttribution,
}

pub async fn attribution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttributionResponse>> {
    let attribution = state
        .service_context
        .payment_service
        .classify_payment(id)
        .await?;

    Ok(Json(AttributionResponse {
        payment_id: id,
        attribution,
    }))
}
