//! Authenticated context for request-scoped identity.

use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;
use crate::auth::token::AccessClaims;
use crate::db::schema::UserType;
use crate::types::{EmailAddress, UserId};

/// Identity and role of the caller, derived from a validated access token.
///
/// Built by the authorization guard for a single request and passed to the
/// downstream operation as an argument. It is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    email: EmailAddress,
    first_name: String,
    last_name: String,
    uid: UserId,
    /// `None` when the token carried no role (e.g. a refresh token)
    role: Option<UserType>,
}

impl AuthContext {
    /// Create a new authenticated context.
    pub fn new(
        email: EmailAddress,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        uid: UserId,
        role: Option<UserType>,
    ) -> Self {
        Self {
            email,
            first_name: first_name.into(),
            last_name: last_name.into(),
            uid,
            role,
        }
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Identifier of the authenticated identity.
    pub fn uid(&self) -> &UserId {
        &self.uid
    }

    pub fn role(&self) -> Option<UserType> {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(UserType::Admin)
    }

    /// Require the caller to hold exactly `role`.
    pub fn require_role(&self, role: UserType) -> Result<(), AuthError> {
        if self.role == Some(role) {
            Ok(())
        } else {
            Err(AuthError::AccessDenied)
        }
    }

    /// Require the caller to be an admin or the owner of `user_id`.
    pub fn require_self_or_admin(&self, user_id: &UserId) -> Result<(), AuthError> {
        if self.is_admin() || (!self.uid.as_str().is_empty() && &self.uid == user_id) {
            Ok(())
        } else {
            Err(AuthError::AccessDenied)
        }
    }
}

impl From<AccessClaims> for AuthContext {
    fn from(claims: AccessClaims) -> Self {
        Self {
            email: claims.email,
            first_name: claims.first_name,
            last_name: claims.last_name,
            uid: claims.uid,
            role: claims.user_type,
        }
    }
}
