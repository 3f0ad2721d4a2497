// POST /api/moderation/decide/{id} — the moderator verdict on a held item.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::moderation::DecisionAction;
use crate::web::auth::Identity;
use crate::web::error::ApiResult;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub action: DecisionAction,
    pub reason: Option<String>,
}

pub async fn decide_content(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(body): Json<DecideRequest>,
) -> ApiResult<Response> {
    identity.require_moderator()?;

    let item = state
        .decisions
        .decide(&id, &identity.user_id, body.action, body.reason.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Moderation decision applied",
        "content": item,
    }))
    .into_response())
}
