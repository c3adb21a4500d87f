//! Authentication and authorization failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Reasons a request is refused at the authorization boundary.
///
/// Every variant maps to `401 Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization: Bearer ...` header
    #[error("You have no permission to access this content!")]
    MissingCredentials,
    /// Bad signature, malformed structure or unexpected algorithm
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    /// `exp` is at or before the current time
    #[error("This token is expired!")]
    TokenExpired,
    /// Valid token, but the role or identity does not grant access
    #[error("You are unauthorized to access this resource!")]
    AccessDenied,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::MissingCredentials.to_string(),
            "You have no permission to access this content!"
        );
        assert_eq!(AuthError::TokenExpired.to_string(), "This token is expired!");
        assert_eq!(
            AuthError::InvalidToken("InvalidSignature".to_string()).to_string(),
            "Invalid token: InvalidSignature"
        );
    }

    #[test]
    fn test_all_auth_errors_are_unauthorized() {
        let errors = vec![
            AuthError::MissingCredentials,
            AuthError::InvalidToken("bad".to_string()),
            AuthError::TokenExpired,
            AuthError::AccessDenied,
        ];

        for error in errors {
            assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
