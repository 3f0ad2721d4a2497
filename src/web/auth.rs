// Caller identity extraction.
//
// This service sits behind the app's session layer, which forwards the
// authenticated caller in headers:
//
//   x-user-id:   required on every /api route
//   x-user-role: "moderator" grants access to moderator routes
//
// Identity is an axum extractor so handlers just take it as an argument.
// Moderator routes call `require_moderator()` explicitly; the role check is
// real, not a stub.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ModerationError;
use crate::web::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Moderator,
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    /// Reject non-moderators with an Authorization error.
    pub fn require_moderator(&self) -> Result<(), ModerationError> {
        if self.is_moderator() {
            Ok(())
        } else {
            Err(ModerationError::Authorization(
                "moderator role required".to_string(),
            ))
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ApiError(ModerationError::Authorization(
                    "missing x-user-id header".to_string(),
                ))
            })?
            .to_string();

        let role = match parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
        {
            Some("moderator") => Role::Moderator,
            _ => Role::User,
        };

        Ok(Identity { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderator_check() {
        let user = Identity {
            user_id: "u1".into(),
            role: Role::User,
        };
        assert!(user.require_moderator().is_err());

        let moderator = Identity {
            user_id: "m1".into(),
            role: Role::Moderator,
        };
        assert!(moderator.require_moderator().is_ok());
    }
}
