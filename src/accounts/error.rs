use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

use crate::auth::{AuthError, PasswordError, StoreError};

/// Failures of account operations, as seen by API callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed body or a field rule violation
    #[error("{0}")]
    Validation(String),
    #[error(
        "Your email or phone number has been used before by someone, please double-check your information carefully!"
    )]
    DuplicateIdentity,
    /// Unknown email or wrong password. Both produce the same message.
    #[error("Your email or password is invalid! Please double-check carefully!")]
    InvalidCredentials,
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error("Hmm maybe there are no users mapped with that ID!")]
    UserNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Hashing or signing failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::DuplicateIdentity
            | Self::InvalidCredentials
            | Self::UserNotFound
            | Self::Store(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Store and internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Store(_) => "Oops! Something went wrong!".to_string(),
            Self::Internal(_) => {
                "Oops! We couldn't process your request! Please try again later!".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{}: invalid value", field))
                })
            })
            .collect::<Vec<_>>();
        // field_errors() is a HashMap
        messages.sort();
        Self::Validation(messages.join("; "))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(format!("token signing failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Unauthorized(auth) = self {
            return auth.into_response();
        }

        if matches!(self, Self::Store(_) | Self::Internal(_)) {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({ "error": self.public_message() }));
        (self.status_code(), body).into_response()
    }
}
