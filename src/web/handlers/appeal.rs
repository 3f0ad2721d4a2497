// POST /api/moderation/appeal/{id} — owner appeal against a rejection.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::web::auth::Identity;
use crate::web::error::ApiResult;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct AppealRequest {
    pub reason: String,
}

pub async fn submit_appeal(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(body): Json<AppealRequest>,
) -> ApiResult<Response> {
    let item = state
        .appeals
        .submit(&id, &identity.user_id, &body.reason)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Appeal submitted successfully",
            "content": item,
        })),
    )
        .into_response())
}
