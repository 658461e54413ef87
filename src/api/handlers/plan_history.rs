use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{api::state::AppState, error::Result, service::ReversalResult};

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReversalResult>> {
    let result = state
        .service_context
        .payment_service
        .delete_plan_history(id)
        .await?;

    Ok(Json(result))
}
