//! Authentication and authorization.
//!
//! - **Credentials**: Argon2id password hashing ([`CredentialVerifier`])
//! - **Tokens**: HS256 access/refresh pairs ([`TokenIssuer`], [`TokenValidator`])
//! - **Guard**: bearer middleware producing an [`AuthContext`] per request
//! - **Store**: identity records and the last issued token pair ([`UserStore`])
//!
//! ## Usage
//!
//! ```ignore
//! let guard = AuthGuard::new(Arc::new(TokenValidator::new(secret)));
//! let protected = Router::new()
//!     .route("/api/user/me", get(me))
//!     .layer(middleware::from_fn_with_state(guard, authenticate));
//! ```

mod context;
mod error;
mod extractor;
mod password;
pub mod token;
mod user_store;

pub use context::AuthContext;
pub use error::AuthError;
pub use extractor::{AuthGuard, authenticate};
pub use password::{CredentialVerifier, PasswordError};
pub use token::{
    ACCESS_TOKEN_TTL, AccessClaims, REFRESH_TOKEN_TTL, RefreshClaims, TokenIssuer, TokenPair,
    TokenSubject, TokenValidator,
};
pub use user_store::{DEFAULT_STORE_TIMEOUT, StoreError, UserStore};
