// Web server — Axum JSON API over the moderation pipeline.
//
// All /api routes require caller identity (x-user-id header, forwarded by the
// app's session layer); moderator routes additionally check x-user-role.
// Errors flow through ApiError so every failure shares one envelope.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::moderation::{
    AppealWorkflow, GatePolicy, ModerationGate, ModerationQueryService, ModeratorDecision,
};
use crate::scoring::ContentScorer;

pub mod auth;
pub mod error;
pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<ModerationGate>,
    pub appeals: Arc<AppealWorkflow>,
    pub decisions: Arc<ModeratorDecision>,
    pub queries: Arc<ModerationQueryService>,
    pub db: Arc<dyn Database>,
}

impl AppState {
    pub fn new(config: &Config, db: Arc<dyn Database>, scorer: Arc<ContentScorer>) -> Self {
        let policy = GatePolicy::from_config(config);
        Self {
            gate: Arc::new(ModerationGate::new(db.clone(), scorer, policy)),
            appeals: Arc::new(AppealWorkflow::new(db.clone())),
            decisions: Arc::new(ModeratorDecision::new(db.clone(), policy)),
            queries: Arc::new(ModerationQueryService::new(db.clone())),
            db,
        }
    }
}

/// Start the Axum server and block until it exits.
pub async fn run_server(
    config: Config,
    db: Arc<dyn Database>,
    scorer: Arc<ContentScorer>,
    port: u16,
    bind: &str,
) -> Result<()> {
    let state = AppState::new(&config, db, scorer);
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Palisade moderation API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/content",
            post(handlers::content::create_content).get(handlers::content::list_content),
        )
        .route(
            "/api/content/{id}",
            get(handlers::content::get_content)
                .put(handlers::content::update_content)
                .delete(handlers::content::delete_content),
        )
        .route("/api/moderation/queue", get(handlers::queue::review_queue))
        .route(
            "/api/moderation/decide/{id}",
            post(handlers::decide::decide_content),
        )
        .route(
            "/api/moderation/appeal/{id}",
            post(handlers::appeal::submit_appeal),
        )
        .route("/api/moderation/stats", get(handlers::stats::get_stats))
        .route(
            "/api/moderation/items/{id}/history",
            get(handlers::queue::item_history),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Deploy health check — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}
