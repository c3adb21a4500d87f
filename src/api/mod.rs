// REST API endpoints for identity-gate

use axum::{
    Extension, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    middleware,
    response::Json,
    routing::{get, post},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::accounts::{AccountService, ApiError, ListQuery, LoginRequest, RegisterRequest};
use crate::auth::{AuthContext, AuthGuard, TokenPair, authenticate};
use crate::db::schema::{PublicUserInfo, UserPage};
use crate::types::UserId;


/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub guard: AuthGuard,
}

impl AppState {
    pub fn new(accounts: AccountService, guard: AuthGuard) -> Self {
        Self {
            accounts: Arc::new(accounts),
            guard,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    // Everything in here runs behind the bearer guard.
    let protected = Router::new()
        .route("/api/user/me", get(me))
        .route("/api/users", get(list_users))
        .route("/api/users/{user_id}", get(fetch_user))
        .route_layer(middleware::from_fn_with_state(
            state.guard.clone(),
            authenticate,
        ));

    Router::new()
        .route("/", get(welcome))
        .route("/api/", get(welcome))
        .route("/api/user/register", post(register))
        .route("/api/user/login", post(login))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn welcome() -> Json<Value> {
    Json(serde_json::json!({
        "message": "Welcome to the identity-gate API!"
    }))
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Json(request) = payload?;
    let tokens = state.accounts.register(request).await?;
    Ok(Json(tokens))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Json(request) = payload?;
    let tokens = state.accounts.login(request).await?;
    Ok(Json(tokens))
}

async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<PublicUserInfo>, ApiError> {
    Ok(Json(state.accounts.me(&ctx).await?))
}

/// Paged listing of every identity. Admin only.
async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<UserPage>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.accounts.list_users(&ctx, &query).await?))
}

async fn fetch_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<String>,
) -> Result<Json<PublicUserInfo>, ApiError> {
    let user_id = UserId::new(user_id);
    Ok(Json(state.accounts.fetch_user(&ctx, &user_id).await?))
}
