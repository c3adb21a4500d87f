//! Registration, login and user lookup.
//!
//! Each credential-bearing operation runs strictly verify → issue → persist
//! → respond. The caller's [`AuthContext`] is passed in explicitly by the
//! protected operations.

use tracing::{debug, info, warn};
use validator::Validate;

use crate::accounts::error::ApiError;
use crate::accounts::requests::{ListQuery, LoginRequest, RegisterRequest};
use crate::auth::{AuthContext, CredentialVerifier, TokenIssuer, TokenPair, TokenSubject, UserStore};
use crate::db::schema::{PublicUserInfo, UserCreate, UserPage, UserType};
use crate::types::{EmailAddress, PhoneNumber, UserId};

/// Account operations over the user store.
#[derive(Clone)]
pub struct AccountService {
    store: UserStore,
    verifier: CredentialVerifier,
    issuer: TokenIssuer,
}

impl AccountService {
    pub fn new(store: UserStore, verifier: CredentialVerifier, issuer: TokenIssuer) -> Self {
        Self {
            store,
            verifier,
            issuer,
        }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Register a new `USER` identity and return its first token pair.
    pub async fn register(&self, request: RegisterRequest) -> Result<TokenPair, ApiError> {
        self.enroll(request, UserType::User).await
    }

    /// Create an `ADMIN` identity. Only reachable from the command line.
    pub async fn create_admin(&self, request: RegisterRequest) -> Result<TokenPair, ApiError> {
        self.enroll(request, UserType::Admin).await
    }

    async fn enroll(&self, request: RegisterRequest, user_type: UserType) -> Result<TokenPair, ApiError> {
        request.validate()?;

        let email = EmailAddress::new(request.email);
        let phone_number = PhoneNumber::new(request.phone_number);

        // Two independent counts; a concurrent registration can slip between them.
        let emails = self.store.count_by_email(&email).await?;
        let phones = self.store.count_by_phone(&phone_number).await?;
        if emails > 0 || phones > 0 {
            warn!(
                "Registration rejected: email in use={}, phone in use={}",
                emails > 0,
                phones > 0
            );
            return Err(ApiError::DuplicateIdentity);
        }

        let hashed_password = self.verifier.hash_password_blocking(request.password).await?;

        let mut create = UserCreate {
            user_id: UserId::generate(),
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            phone_number,
            user_type,
            hashed_password,
            access_token: None,
            refresh_token: None,
        };

        let tokens = self.issuer.issue_tokens(&TokenSubject::from(&create))?;
        create.access_token = Some(tokens.access_token.clone());
        create.refresh_token = Some(tokens.refresh_token.clone());

        let user = self.store.create_user(&create).await?;
        info!("Registered {} identity {}", user.user_type, user.user_id);

        Ok(tokens)
    }

    /// Authenticate by email and password and issue a fresh token pair.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, ApiError> {
        request.validate()?;

        let email = EmailAddress::new(request.email);
        let Some(user) = self.store.get_user_by_email(&email).await? else {
            debug!("Login failed: unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        let verified = self
            .verifier
            .verify_password_blocking(user.hashed_password.clone(), request.password)
            .await;
        if !verified {
            debug!("Login failed: wrong password for {}", user.user_id);
            return Err(ApiError::InvalidCredentials);
        }

        let tokens = self.issuer.issue_tokens(&TokenSubject::from(&user))?;
        self.store
            .record_issued_tokens(&user.user_id, &tokens.access_token, &tokens.refresh_token)
            .await?;

        info!("User {} logged in", user.user_id);
        Ok(tokens)
    }

    /// Public info of the caller's own identity.
    pub async fn me(&self, ctx: &AuthContext) -> Result<PublicUserInfo, ApiError> {
        self.load_public(ctx.uid()).await
    }

    /// Public info of `user_id`. The caller must be that user or an admin.
    pub async fn fetch_user(&self, ctx: &AuthContext, user_id: &UserId) -> Result<PublicUserInfo, ApiError> {
        ctx.require_self_or_admin(user_id)?;
        self.load_public(user_id).await
    }

    /// Page through all identities. Admin only.
    pub async fn list_users(&self, ctx: &AuthContext, query: &ListQuery) -> Result<UserPage, ApiError> {
        ctx.require_role(UserType::Admin)?;
        Ok(self
            .store
            .list_users(query.page(), query.records_per_page())
            .await?)
    }

    async fn load_public(&self, user_id: &UserId) -> Result<PublicUserInfo, ApiError> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .map(|user| user.to_public())
            .ok_or(ApiError::UserNotFound)
    }
}
