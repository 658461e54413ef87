use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{CreateTaskRequest, Task, UpdateTaskRequest},
    error::Result,
    repository::TaskRepository,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Task>>> {
    let tasks = state.service_context.task_repo.list().await?;

    Ok(Json(tasks))
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>)> {
    let task = state.service_context.task_repo.create(request).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    let task = state.service_context.task_repo.update(id, request).await?;

    Ok(Json(task))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.service_context.task_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
