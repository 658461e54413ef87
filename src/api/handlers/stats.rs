use axum::{extract::State, Json};

use crate::{api::state::AppState, error::Result, service::DashboardStats};

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    let stats = state.service_context.stats_service.dashboard().await?;

    Ok(Json(stats))
}
