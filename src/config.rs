use std::{fmt, path::PathBuf, time::Duration};

use crate::auth::{
    ACCESS_TOKEN_TTL, DEFAULT_STORE_TIMEOUT, REFRESH_TOKEN_TTL, TokenIssuer, TokenValidator,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set to a non-empty value")]
    MissingSecret,
    #[error("{name} must be greater than zero")]
    ZeroDuration { name: &'static str },
}

/// Process-wide HMAC signing secret. Never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl From<String> for SecretKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Settings shared by every request: signing secret, token lifetimes and
/// the store timeout. Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub secret_key: SecretKey,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub store_timeout: Duration,
}

impl AuthSettings {
    pub fn new(secret_key: impl Into<SecretKey>) -> Self {
        Self {
            secret_key: secret_key.into(),
            access_ttl: ACCESS_TOKEN_TTL,
            refresh_ttl: REFRESH_TOKEN_TTL,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        for (name, value) in [
            ("access token lifetime", self.access_ttl),
            ("refresh token lifetime", self.refresh_ttl),
            ("REQUEST_TIMEOUT_SECS", self.store_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration { name });
            }
        }
        Ok(())
    }

    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer::with_ttls(self.secret_key.as_bytes(), self.access_ttl, self.refresh_ttl)
    }

    pub fn token_validator(&self) -> TokenValidator {
        TokenValidator::new(self.secret_key.as_bytes())
    }
}

/// Load `.env` from the working directory if present.
///
/// Variables already set in the process environment win. Returns the path
/// that was loaded, or `None` when there is no `.env` file. Runs before the
/// tracing subscriber exists, so the caller logs the outcome.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    dotenv_outcome(dotenvy::dotenv())
}

fn dotenv_outcome(
    result: Result<PathBuf, dotenvy::Error>,
) -> Result<Option<PathBuf>, dotenvy::Error> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
