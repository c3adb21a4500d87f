//! Identity storage.
//!
//! Every query is bounded by the store timeout so a stalled database fails
//! the request instead of hanging it.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::db::Db;
use crate::db::schema::{CountRow, PublicUserInfo, UserCreate, UserPage, UserRecord};
use crate::types::{EmailAddress, PhoneNumber, UserId};

/// Default bound on a single store operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(100);

/// Errors raised by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store operation `{operation}` timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
    #[error("database error: {0}")]
    Database(#[from] surrealdb::Error),
    #[error("store returned no record for `{0}`")]
    MissingResult(&'static str),
}

/// User store for database operations.
#[derive(Clone)]
pub struct UserStore {
    db: Db,
    timeout: Duration,
}

impl UserStore {
    /// Create a new user store with the default timeout.
    pub fn new(db: Db) -> Self {
        Self::with_timeout(db, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(db: Db, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Store operation {} timed out after {:?}", operation, self.timeout);
                Err(StoreError::Timeout {
                    operation,
                    timeout: self.timeout,
                })
            }
        }
    }

    /// Number of identities registered with this email.
    pub async fn count_by_email(&self, email: &EmailAddress) -> Result<u64, StoreError> {
        let email = email.as_str().to_string();
        self.bounded("count_by_email", async {
            let mut res = self
                .db
                .query("SELECT count() FROM user WHERE email = $email GROUP ALL")
                .bind(("email", email))
                .await?;
            let rows: Vec<CountRow> = res.take(0)?;
            Ok::<_, StoreError>(rows.first().map(|r| r.count).unwrap_or(0))
        })
        .await
    }

    /// Number of identities registered with this phone number.
    pub async fn count_by_phone(&self, phone_number: &PhoneNumber) -> Result<u64, StoreError> {
        let phone_number = phone_number.as_str().to_string();
        self.bounded("count_by_phone", async {
            let mut res = self
                .db
                .query("SELECT count() FROM user WHERE phone_number = $phone_number GROUP ALL")
                .bind(("phone_number", phone_number))
                .await?;
            let rows: Vec<CountRow> = res.take(0)?;
            Ok::<_, StoreError>(rows.first().map(|r| r.count).unwrap_or(0))
        })
        .await
    }

    /// Insert a new identity.
    pub async fn create_user(&self, create: &UserCreate) -> Result<UserRecord, StoreError> {
        let create = create.clone();

        self.bounded("create_user", async move {
            let query = r#"
                CREATE user CONTENT {
                    user_id: $user_id,
                    first_name: $first_name,
                    last_name: $last_name,
                    email: $email,
                    phone_number: $phone_number,
                    user_type: $user_type,
                    hashed_password: $hashed_password,
                    access_token: $access_token,
                    refresh_token: $refresh_token,
                    created_at: time::now(),
                    updated_at: time::now()
                }
            "#;

            let mut res = self
                .db
                .query(query)
                .bind(("user_id", create.user_id.into_inner()))
                .bind(("first_name", create.first_name))
                .bind(("last_name", create.last_name))
                .bind(("email", create.email.into_inner()))
                .bind(("phone_number", create.phone_number.into_inner()))
                .bind(("user_type", create.user_type.as_str()))
                .bind(("hashed_password", create.hashed_password))
                .bind(("access_token", create.access_token))
                .bind(("refresh_token", create.refresh_token))
                .await?;

            let users: Vec<UserRecord> = res.take(0)?;
            users
                .into_iter()
                .next()
                .ok_or(StoreError::MissingResult("create_user"))
        })
        .await
    }

    /// Get an identity by email.
    pub async fn get_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, StoreError> {
        let email = email.as_str().to_string();
        self.bounded("get_user_by_email", async {
            let mut res = self
                .db
                .query("SELECT * FROM user WHERE email = $email LIMIT 1")
                .bind(("email", email))
                .await?;
            let users: Vec<UserRecord> = res.take(0)?;
            Ok::<_, StoreError>(users.into_iter().next())
        })
        .await
    }

    /// Get an identity by its public identifier.
    pub async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        let user_id = user_id.as_str().to_string();
        self.bounded("get_user_by_id", async {
            let mut res = self
                .db
                .query("SELECT * FROM user WHERE user_id = $user_id LIMIT 1")
                .bind(("user_id", user_id))
                .await?;
            let users: Vec<UserRecord> = res.take(0)?;
            Ok::<_, StoreError>(users.into_iter().next())
        })
        .await
    }

    /// Overwrite the last issued token pair of an existing identity.
    ///
    /// Update-only: no record is created when `user_id` is unknown. Returns
    /// whether a record was matched.
    pub async fn record_issued_tokens(
        &self,
        user_id: &UserId,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<bool, StoreError> {
        let uid = user_id.as_str().to_string();
        let access_token = access_token.to_string();
        let refresh_token = refresh_token.to_string();

        let matched = self
            .bounded("record_issued_tokens", async {
                let query = r#"
                    UPDATE user SET
                        access_token = $access_token,
                        refresh_token = $refresh_token,
                        updated_at = time::now()
                    WHERE user_id = $user_id
                "#;

                let mut res = self
                    .db
                    .query(query)
                    .bind(("user_id", uid))
                    .bind(("access_token", access_token))
                    .bind(("refresh_token", refresh_token))
                    .await?;
                let updated: Vec<UserRecord> = res.take(0)?;
                Ok::<_, StoreError>(!updated.is_empty())
            })
            .await?;

        if matched {
            debug!("Recorded issued tokens for user {}", user_id);
        } else {
            warn!("No identity matched {} while recording issued tokens", user_id);
        }

        Ok(matched)
    }

    /// One page of identities ordered by creation time.
    ///
    /// `page` is 1-based.
    pub async fn list_users(&self, page: u32, per_page: u32) -> Result<UserPage, StoreError> {
        let start = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        let limit = u64::from(per_page);

        self.bounded("list_users", async {
            let mut res = self
                .db
                .query("SELECT count() FROM user GROUP ALL")
                .query("SELECT * FROM user ORDER BY created_at ASC LIMIT $limit START $start")
                .bind(("limit", limit))
                .bind(("start", start))
                .await?;

            let counts: Vec<CountRow> = res.take(0)?;
            let users: Vec<UserRecord> = res.take(1)?;

            Ok::<_, StoreError>(UserPage {
                total_count: counts.first().map(|r| r.count).unwrap_or(0),
                user_items: users.iter().map(UserRecord::to_public).collect::<Vec<PublicUserInfo>>(),
            })
        })
        .await
    }
}
