use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{CreateMemberRequest, Member, Payment, PlanHistory, UpdateMemberRequest},
    error::{AppError, Result},
    repository::{MemberRepository, PaymentRepository, PlanHistoryRepository},
    service::MemberStatusView,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    members: Vec<MemberDto>,
    total: usize,
}

#[derive(Debug, Serialize)]
pub struct MemberDto {
    id: Uuid,
    full_name: String,
    email: String,
    phone: Option<String>,
    joined_at: String,
    active_plan_id: Option<Uuid>,
    notes: Option<String>,
}

impl From<Member> for MemberDto {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            full_name: member.full_name,
            email: member.email,
            phone: member.phone,
            joined_at: member.joined_at.to_rfc3339(),
            active_plan_id: member.active_plan_id,
            notes: member.notes,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let members = state
        .service_context
        .member_repo
        .list(params.limit, params.offset)
        .await?;

    let total = members.len();
    let members: Vec<MemberDto> = members.into_iter().map(Into::into).collect();

    Ok(Json(ListResponse { members, total }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberDto>> {
    let member = state
        .service_context
        .member_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok(Json(member.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<MemberDto>)> {
    let member = state
        .service_context
        .member_service
        .register_member(request)
        .await?;

    Ok((StatusCode::CREATED, Json(member.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMemberRequest>,
) -> Result<Json<MemberDto>> {
    let member = state.service_context.member_repo.update(id, request).await?;

    Ok(Json(member.into()))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.service_context.member_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberStatusView>> {
    let view = state.service_context.member_service.member_status(id).await?;

    Ok(Json(view))
}

pub async fn plan_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlanHistory>>> {
    let rows = state
        .service_context
        .plan_history_repo
        .find_by_member(id)
        .await?;

    Ok(Json(rows))
}

pub async fn payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>> {
    let rows = state.service_context.payment_repo.find_by_member(id).await?;

    Ok(Json(rows))
}
