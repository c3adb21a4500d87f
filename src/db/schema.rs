use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{RecordId, sql::Datetime};

use crate::types::{EmailAddress, PhoneNumber, UserId};

/// Role tag of an identity. The set is closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Admin,
    #[default]
    User,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(format!("unknown user type: {}", other)),
        }
    }
}

/// Persisted identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Database identifier
    pub id: RecordId,
    /// Public immutable identifier
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    /// Role tag
    pub user_type: UserType,
    /// Argon2 PHC string
    pub hashed_password: String,
    /// Last issued access token (advisory, never used for validation)
    #[serde(default)]
    pub access_token: Option<String>,
    /// Last issued refresh token (advisory, never used for validation)
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Set by the database (`time::now()`)
    pub created_at: Datetime,
    pub updated_at: Datetime,
}

impl UserRecord {
    /// Name shown to other users: both names, or whichever one is set.
    pub fn displaying_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }

    /// Project into the publicly visible shape.
    pub fn to_public(&self) -> PublicUserInfo {
        PublicUserInfo {
            user_id: self.user_id.clone(),
            displaying_name: self.displaying_name(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            user_type: self.user_type,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        }
    }
}

/// Payload for creating a new identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    pub user_type: UserType,
    pub hashed_password: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Identity fields safe to return to API callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUserInfo {
    pub user_id: UserId,
    pub displaying_name: String,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of the identity listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPage {
    pub total_count: u64,
    pub user_items: Vec<PublicUserInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountRow {
    pub count: u64,
}
