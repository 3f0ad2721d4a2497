// Domain error taxonomy.
//
// Every moderation operation returns Result<_, ModerationError> so callers
// (the web layer, the CLI) can map failures to actionable responses. Provider
// degradation is deliberately NOT a variant — a scorer falling back to the
// heuristic is an observability signal, never a caller-facing failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModerationError {
    /// Malformed input: empty text, over-length text, bad ids.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A workflow rule was violated (e.g. appealing a non-rejected item,
    /// deciding an item that is not under review).
    #[error("{0}")]
    PreconditionFailed(String),

    /// The caller is not allowed to perform this operation on this item.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// A concurrent write won the race. The caller should re-read and retry.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Infrastructure failure (database, serialization). Never carries
    /// user-correctable detail.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ModerationError {
    /// Stable machine-readable code, used in the HTTP error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ModerationError::Validation(_) => "VALIDATION_ERROR",
            ModerationError::PreconditionFailed(_) => "PRECONDITION_FAILED",
            ModerationError::Authorization(_) => "AUTHORIZATION_ERROR",
            ModerationError::Conflict(_) => "CONFLICT",
            ModerationError::NotFound(_) => "NOT_FOUND",
            ModerationError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<rusqlite::Error> for ModerationError {
    fn from(e: rusqlite::Error) -> Self {
        ModerationError::Internal(anyhow::Error::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            ModerationError::Validation("x".into()).code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            ModerationError::Conflict("x".into()).code(),
            "CONFLICT"
        );
        assert_eq!(
            ModerationError::NotFound("x".into()).code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn precondition_message_is_verbatim() {
        let e = ModerationError::PreconditionFailed("appeal already pending".into());
        assert_eq!(e.to_string(), "appeal already pending");
    }
}
