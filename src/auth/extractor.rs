//! Bearer-token authorization guard for HTTP requests.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::auth::context::AuthContext;
use crate::auth::error::AuthError;
use crate::auth::token::TokenValidator;

const BEARER_PREFIX: &str = "Bearer ";

/// Validates bearer tokens and produces the per-request [`AuthContext`].
#[derive(Clone)]
pub struct AuthGuard {
    validator: Arc<TokenValidator>,
}

impl AuthGuard {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }

    /// Authenticate from a raw `Authorization` header value.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<AuthContext, AuthError> {
        let token = authorization
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .ok_or(AuthError::MissingCredentials)?;

        let claims = self.validator.validate_token(token)?;
        debug!("Bearer token accepted for uid {}", claims.uid);

        Ok(AuthContext::from(claims))
    }

    /// Authenticate from request headers. A non-UTF-8 header counts as missing.
    pub fn authorize_headers(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let authorization = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
        self.authorize(authorization)
    }
}

/// Middleware: reject with 401 unless the request carries a valid bearer
/// token; otherwise attach the [`AuthContext`] and continue.
pub async fn authenticate(
    State(guard): State<AuthGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    match guard.authorize_headers(req.headers()) {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => {
            debug!("Rejected {} {}: {}", req.method(), req.uri().path(), err);
            err.into_response()
        }
    }
}
