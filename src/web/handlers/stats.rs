// GET /api/moderation/stats — aggregate counts for the moderator dashboard.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::web::auth::Identity;
use crate::web::error::ApiResult;
use crate::web::AppState;

pub async fn get_stats(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Response> {
    identity.require_moderator()?;

    let stats = state.queries.stats().await?;
    Ok(Json(json!({ "success": true, "stats": stats })).into_response())
}
