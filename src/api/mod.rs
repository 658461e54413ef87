pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, service::ServiceContext};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // API routes
        .nest("/api", api_routes())
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/members", member_routes())
        .nest("/plans", plan_routes())
        .nest("/payments", payment_routes())
        .nest("/plan-history", plan_history_routes())
        .nest("/tasks", task_routes())
        .route("/stats", get(handlers::stats::dashboard))
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::members::list))
        .route("/", post(handlers::members::create))
        .route("/:id", get(handlers::members::get))
        .route("/:id", put(handlers::members::update))
        .route("/:id", delete(handlers::members::delete))
        .route("/:id/status", get(handlers::members::status))
        .route("/:id/plan-history", get(handlers::members::plan_history))
        .route("/:id/payments", get(handlers::members::payments))
        .route("/:id/payments", post(handlers::payments::record))
}

fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::plans::list))
        .route("/", post(handlers::plans::create))
        .route("/:id", get(handlers::plans::get))
        .route("/:id", put(handlers::plans::update))
        .route("/:id", delete(handlers::plans::delete))
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::payments::list_recent))
        .route("/:id", get(handlers::payments::get))
        .route("/:id/attribution", get(handlers::payments::attribution))
}

fn plan_history_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(handlers::plan_history::delete))
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::tasks::list))
        .route("/", post(handlers::tasks::create))
        .route("/:id", put(handlers::tasks::update))
        .route("/:id", delete(handlers::tasks::delete))
}
