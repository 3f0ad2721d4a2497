// Moderator read endpoints.
//
// GET /api/moderation/queue              — paginated review queue
// GET /api/moderation/items/{id}/history — full audit trail for one item

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::web::auth::Identity;
use crate::web::error::ApiResult;
use crate::web::AppState;

use super::PageQuery;

pub async fn review_queue(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<PageQuery>,
) -> ApiResult<Response> {
    identity.require_moderator()?;

    let page = state.queries.review_queue(params.page, params.limit).await?;
    Ok(Json(json!({
        "success": true,
        "items": page.items,
        "pagination": page.pagination,
    }))
    .into_response())
}

pub async fn item_history(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    identity.require_moderator()?;

    let history = state.queries.audit_trail(&id).await?;
    Ok(Json(json!({
        "success": true,
        "item_id": id,
        "history": history,
    }))
    .into_response())
}
