use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{CreatePlanRequest, Plan, UpdatePlanRequest},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    include_deleted: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Plan>>> {
    let plans = state
        .service_context
        .plan_service
        .list(params.include_deleted)
        .await?;

    Ok(Json(plans))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Plan>> {
    let plan = state
        .service_context
        .plan_service
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

    Ok(Json(plan))
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<Plan>)> {
    let plan = state.service_context.plan_service.create(request).await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePlanRequest>,
) -> Result<Json<Plan>> {
    let plan = state.service_context.plan_service.update(id, request).await?;

    Ok(Json(plan))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.service_context.plan_service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
