// Core modules
mod accounts;
pub mod api;
pub mod auth;
mod config;
pub mod db;
mod types;

// Re-export key types and functions
pub use accounts::{AccountService, ApiError, ListQuery, LoginRequest, RegisterRequest};
pub use api::{AppState, create_router};
pub use config::{AuthSettings, ConfigError, SecretKey, load_dotenv};
pub use db::{DatabaseConfig, Db, create_connection, ensure_schema};
pub use types::{EmailAddress, PhoneNumber, UserId};

use auth::{AuthGuard, CredentialVerifier, UserStore};
use std::sync::Arc;

/// Build the account service for `settings` over an open database.
pub fn create_account_service(settings: &AuthSettings, db: Db) -> AccountService {
    AccountService::new(
        UserStore::with_timeout(db, settings.store_timeout),
        CredentialVerifier::default(),
        settings.token_issuer(),
    )
}

/// Convenience function to wire the HTTP state: account service and bearer guard
/// sharing one secret.
pub fn create_app_state(settings: &AuthSettings, db: Db) -> AppState {
    let guard = AuthGuard::new(Arc::new(settings.token_validator()));
    AppState::new(create_account_service(settings, db), guard)
}
