// Content handlers — the user-facing surface the gate sits in front of.
//
// POST   /api/content      — create (gated)
// GET    /api/content      — visible feed, paginated
// GET    /api/content/{id} — fetch one (visibility rules apply)
// PUT    /api/content/{id} — owner edit (re-gated)
// DELETE /api/content/{id} — owner delete (cascades to audit history)

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::db::models::ContentKind;
use crate::error::ModerationError;
use crate::moderation::{GateDecision, GateOutcome};
use crate::web::auth::Identity;
use crate::web::error::ApiResult;
use crate::web::AppState;

use super::PageQuery;

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub kind: Option<ContentKind>,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub text: String,
}

/// POST /api/content — run the submission through the moderation gate.
pub async fn create_content(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<CreateContentRequest>,
) -> ApiResult<Response> {
    let kind = body.kind.unwrap_or(ContentKind::Post);
    let decision = state
        .gate
        .evaluate_new(&identity.user_id, kind, &body.text)
        .await?;

    if decision.outcome == GateOutcome::Blocked {
        return Ok(blocked_response(&decision));
    }
    Ok((StatusCode::CREATED, Json(gate_body(&decision))).into_response())
}

/// PUT /api/content/{id} — owner edit; the new text is re-scored and the
/// item may move back under review.
pub async fn update_content(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(body): Json<UpdateContentRequest>,
) -> ApiResult<Response> {
    let decision = state
        .gate
        .evaluate_edit(&id, &identity.user_id, &body.text)
        .await?;
    Ok(Json(gate_body(&decision)).into_response())
}

/// GET /api/content — the visible feed.
pub async fn list_content(
    State(state): State<AppState>,
    _identity: Identity,
    Query(params): Query<PageQuery>,
) -> ApiResult<Response> {
    let page = state.queries.visible_items(params.page, params.limit).await?;
    Ok(Json(json!({
        "success": true,
        "items": page.items,
        "pagination": page.pagination,
    }))
    .into_response())
}

/// GET /api/content/{id}. Hidden items are served only to their owner and
/// to moderators; everyone else gets 404 rather than confirmation the item
/// exists.
pub async fn get_content(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let item = state
        .db
        .get_content(&id)
        .await
        .map_err(ModerationError::Internal)?
        .ok_or_else(|| ModerationError::NotFound(format!("content {id} not found")))?;

    if !item.is_visible && item.owner_id != identity.user_id && !identity.is_moderator() {
        return Err(ModerationError::NotFound(format!("content {id} not found")).into());
    }

    Ok(Json(json!({ "success": true, "content": item })).into_response())
}

/// DELETE /api/content/{id} — owner only; removes the item and its audit
/// history.
pub async fn delete_content(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let item = state
        .db
        .get_content(&id)
        .await
        .map_err(ModerationError::Internal)?
        .ok_or_else(|| ModerationError::NotFound(format!("content {id} not found")))?;

    if item.owner_id != identity.user_id {
        return Err(ModerationError::Authorization(
            "only the content owner may delete this item".to_string(),
        )
        .into());
    }

    state
        .db
        .delete_content(&id)
        .await
        .map_err(ModerationError::Internal)?;

    Ok(Json(json!({ "success": true, "message": "Content deleted" })).into_response())
}

/// Success body shared by create and update.
fn gate_body(decision: &GateDecision) -> serde_json::Value {
    json!({
        "success": true,
        "message": decision.message,
        "content": decision.item,
        "moderation_status": decision.status,
        "visible": decision.visible,
    })
}

/// 400 envelope for hard-policy blocks, carrying enough detail for the
/// client to explain the refusal.
fn blocked_response(decision: &GateDecision) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "message": decision.message,
            "error": {
                "code": "CONTENT_BLOCKED",
                "reasons": decision.score.reasons,
                "confidence": decision.score.confidence,
                "moderation_id": decision.audit_entry_id,
                "is_appealable": false,
                "help": "Contact support if you believe this is an error",
            },
        })),
    )
        .into_response()
}
