// HTTP error envelope.
//
// ApiError wraps ModerationError so handlers can use `?` and still produce
// the JSON shape clients expect:
//
//   { "success": false, "message": "...", "error": { "code": "..." } }
//
// Internal errors are logged server-side and collapsed to a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::ModerationError;

pub struct ApiError(pub ModerationError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ModerationError> for ApiError {
    fn from(e: ModerationError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ModerationError::Validation(_) | ModerationError::PreconditionFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            ModerationError::Authorization(_) => StatusCode::FORBIDDEN,
            ModerationError::NotFound(_) => StatusCode::NOT_FOUND,
            ModerationError::Conflict(_) => StatusCode::CONFLICT,
            ModerationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "Internal error serving request");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "success": false,
                "message": message,
                "error": { "code": self.0.code() },
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (ModerationError::Validation("x".into()), 400),
            (ModerationError::PreconditionFailed("x".into()), 400),
            (ModerationError::Authorization("x".into()), 403),
            (ModerationError::NotFound("x".into()), 404),
            (ModerationError::Conflict("x".into()), 409),
        ];
        for (err, expected) in cases {
            let resp = ApiError(err).into_response();
            assert_eq!(resp.status().as_u16(), expected);
        }
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ModerationError::Internal(anyhow::anyhow!("disk exploded at /secret/path"));
        let resp = ApiError(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
