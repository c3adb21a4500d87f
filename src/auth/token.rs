//! Access/refresh token issuance and validation (HS256).

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;
use crate::db::schema::{UserCreate, UserRecord, UserType};
use crate::types::{EmailAddress, UserId};

/// Lifetime of an access token.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(168 * 60 * 60);

/// Registered claims shared by both token kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredClaims {
    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,
    /// Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Token ID, unique per issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl RegisteredClaims {
    fn expiring_in(now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            exp: now.timestamp().saturating_add(ttl),
            iat: Some(now.timestamp()),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        }
    }
}

/// Access token payload.
///
/// Identity fields default to empty when absent, so a refresh token decodes
/// as an access token with no identity. Only `exp` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(default)]
    pub email: EmailAddress,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub uid: UserId,
    #[serde(default)]
    pub user_type: Option<UserType>,
    #[serde(flatten)]
    pub registered: RegisteredClaims,
}

/// Refresh token payload. Carries no identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,
}

/// Identity fields embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
}

impl From<&UserRecord> for TokenSubject {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.user_id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            user_type: user.user_type,
        }
    }
}

impl From<&UserCreate> for TokenSubject {
    fn from(user: &UserCreate) -> Self {
        Self {
            user_id: user.user_id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            user_type: user.user_type,
        }
    }
}

/// Signed access + refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs new token pairs with the process secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttls(secret, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL)
    }

    pub fn with_ttls(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a fresh access/refresh pair for `subject`.
    pub fn issue_tokens(&self, subject: &TokenSubject) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        self.issue_tokens_at(subject, Utc::now())
    }

    /// Issue a pair as if the current time were `now`.
    pub fn issue_tokens_at(
        &self,
        subject: &TokenSubject,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let access_claims = AccessClaims {
            email: subject.email.clone(),
            first_name: subject.first_name.clone(),
            last_name: subject.last_name.clone(),
            uid: subject.user_id.clone(),
            user_type: Some(subject.user_type),
            registered: RegisteredClaims::expiring_in(now, self.access_ttl),
        };
        let refresh_claims = RefreshClaims {
            registered: RegisteredClaims::expiring_in(now, self.refresh_ttl),
        };

        let header = Header::new(Algorithm::HS256);
        let access_token = encode(&header, &access_claims, &self.encoding_key)?;
        let refresh_token = encode(&header, &refresh_claims, &self.encoding_key)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

/// Verifies tokens signed with the process secret.
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in validate_token_at with an exclusive boundary.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify signature and expiry against the current time.
    pub fn validate_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.validate_token_at(token, Utc::now().timestamp())
    }

    /// Verify signature and expiry against `now` (Unix seconds).
    ///
    /// `exp <= now` is expired.
    pub fn validate_token_at(&self, token: &str, now: i64) -> Result<AccessClaims, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.registered.exp <= now {
            return Err(AuthError::TokenExpired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-testing-minimum-32-chars";

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: UserId::new("user123"),
            email: EmailAddress::new("a@x.com"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            user_type: UserType::User,
        }
    }

    fn payload(token: &str) -> serde_json::Value {
        let segment = token.split('.').nth(1).unwrap();
        let header = jsonwebtoken::decode_header(token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        // Decode without verification to inspect the raw claim names.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);
        let data = decode::<serde_json::Value>(token, &DecodingKey::from_secret(b""), &validation)
            .unwrap_or_else(|e| panic!("payload {} undecodable: {}", segment, e));
        data.claims
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let issuer = TokenIssuer::new(TEST_SECRET);
        let validator = TokenValidator::new(TEST_SECRET);

        let pair = issuer.issue_tokens(&subject()).unwrap();
        let claims = validator.validate_token(&pair.access_token).unwrap();

        assert_eq!(claims.email.as_str(), "a@x.com");
        assert_eq!(claims.first_name, "Ada");
        assert_eq!(claims.last_name, "Lovelace");
        assert_eq!(claims.uid.as_str(), "user123");
        assert_eq!(claims.user_type, Some(UserType::User));
    }

    #[test]
    fn test_expirations() {
        let issuer = TokenIssuer::new(TEST_SECRET);
        let validator = TokenValidator::new(TEST_SECRET);
        let now = Utc::now();

        let pair = issuer.issue_tokens_at(&subject(), now).unwrap();
        let access = validator.validate_token_at(&pair.access_token, now.timestamp()).unwrap();
        let refresh = validator.validate_token_at(&pair.refresh_token, now.timestamp()).unwrap();

        assert_eq!(access.registered.exp, now.timestamp() + 24 * 3600);
        assert_eq!(refresh.registered.exp, now.timestamp() + 168 * 3600);
    }

    #[test]
    fn test_wire_format_claim_names() {
        let pair = TokenIssuer::new(TEST_SECRET).issue_tokens(&subject()).unwrap();

        let access = payload(&pair.access_token);
        for field in ["email", "first_name", "last_name", "uid", "user_type", "exp", "iat", "jti"] {
            assert!(access.get(field).is_some(), "access token missing {}", field);
        }
        assert_eq!(access["user_type"], "USER");

        let refresh = payload(&pair.refresh_token);
        let keys: Vec<&String> = refresh.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(refresh.get("exp").is_some());
        assert!(refresh.get("email").is_none());
        assert!(refresh.get("uid").is_none());
    }

    #[test]
    fn test_validate_is_idempotent() {
        let pair = TokenIssuer::new(TEST_SECRET).issue_tokens(&subject()).unwrap();
        let validator = TokenValidator::new(TEST_SECRET);

        let first = validator.validate_token(&pair.access_token).unwrap();
        let second = validator.validate_token(&pair.access_token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let pair = TokenIssuer::new(TEST_SECRET).issue_tokens_at(&subject(), now).unwrap();
        let validator = TokenValidator::new(TEST_SECRET);
        let exp = now.timestamp() + 24 * 3600;

        assert!(validator.validate_token_at(&pair.access_token, exp - 1).is_ok());
        assert_eq!(
            validator.validate_token_at(&pair.access_token, exp),
            Err(AuthError::TokenExpired)
        );
        assert_eq!(
            validator.validate_token_at(&pair.access_token, exp + 1),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_expired_token_rejected_against_real_clock() {
        let long_ago = Utc::now() - chrono::Duration::days(30);
        let pair = TokenIssuer::new(TEST_SECRET).issue_tokens_at(&subject(), long_ago).unwrap();

        let validator = TokenValidator::new(TEST_SECRET);
        assert_eq!(validator.validate_token(&pair.access_token), Err(AuthError::TokenExpired));
        assert_eq!(validator.validate_token(&pair.refresh_token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let pair = TokenIssuer::new(TEST_SECRET).issue_tokens(&subject()).unwrap();
        let validator = TokenValidator::new(TEST_SECRET);

        let (head, signature) = pair.access_token.rsplit_once('.').unwrap();
        // Every signature character except the last carries six full bits,
        // so swapping one always changes the decoded bytes.
        for index in 0..signature.len() - 1 {
            let mut chars: Vec<char> = signature.chars().collect();
            chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
            let tampered = format!("{}.{}", head, chars.into_iter().collect::<String>());

            assert!(matches!(
                validator.validate_token(&tampered),
                Err(AuthError::InvalidToken(_))
            ));
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let pair = TokenIssuer::new(TEST_SECRET).issue_tokens(&subject()).unwrap();
        let validator = TokenValidator::new(b"wrong-secret-key-for-testing-minimum-32-chars");

        assert!(matches!(
            validator.validate_token(&pair.access_token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let validator = TokenValidator::new(TEST_SECRET);
        for token in ["", "invalid", "invalid.token.here", "a.b"] {
            assert!(matches!(
                validator.validate_token(token),
                Err(AuthError::InvalidToken(_))
            ));
        }
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let claims = RefreshClaims {
            registered: RegisteredClaims::expiring_in(Utc::now(), ACCESS_TOKEN_TTL),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert!(matches!(
            TokenValidator::new(TEST_SECRET).validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_missing_exp_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "email": "a@x.com", "uid": "user123" }),
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert!(matches!(
            TokenValidator::new(TEST_SECRET).validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_refresh_token_validates_without_identity() {
        let pair = TokenIssuer::new(TEST_SECRET).issue_tokens(&subject()).unwrap();
        let claims = TokenValidator::new(TEST_SECRET)
            .validate_token(&pair.refresh_token)
            .unwrap();

        assert_eq!(claims.uid.as_str(), "");
        assert_eq!(claims.email.as_str(), "");
        assert_eq!(claims.user_type, None);
    }

    #[test]
    fn test_tokens_differ_between_issuances() {
        let issuer = TokenIssuer::new(TEST_SECRET);
        let now = Utc::now();

        let first = issuer.issue_tokens_at(&subject(), now).unwrap();
        let second = issuer.issue_tokens_at(&subject(), now).unwrap();
        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_token_pair_serializes_camel_case() {
        let pair = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
    }
}
