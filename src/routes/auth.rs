//! Registration, login, and token verification endpoints under `/api/auth`.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use validator::Validate;

use crate::auth;
use crate::db::DatabaseOperations;
use crate::models::{AppState, LoginRequest, RegisterRequest, Token, User, UserResponse};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/verify", get(verify))
        .route("/api/auth/logout", post(logout))
        .with_state(state)
}

/// Pull the bearer token from the Authorization header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Auth("Missing bearer token".to_string()))
}

/// Resolve the authenticated user from the request headers. Requires both a
/// valid token and a reachable database.
pub(crate) async fn current_user(state: &AppState, headers: &HeaderMap) -> AppResult<User> {
    let token = bearer_token(headers)?;
    let claims = auth::verify_token(&state.config.auth, token)?;
    let user_id = claims
        .sub
        .parse::<uuid::Uuid>()
        .map_err(|_| AppError::Auth("Malformed token subject".to_string()))?;

    let pool = state.pool.as_ref().ok_or(AppError::DatabaseUnavailable)?;
    DatabaseOperations::get_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::Auth("User no longer exists".to_string()))
}

#[derive(Debug, serde::Serialize)]
struct AuthResponse {
    #[serde(flatten)]
    token: Token,
    user: UserResponse,
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<ResponseJson<AuthResponse>> {
    request
        .validate()
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    let pool = state.pool.as_ref().ok_or(AppError::DatabaseUnavailable)?;

    if DatabaseOperations::get_user_by_email(pool, &request.email)
        .await?
        .is_some()
    {
        return Err(AppError::InvalidRequest(
            "Email already registered".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let user =
        DatabaseOperations::create_user(pool, &request.name, &request.email, &password_hash)
            .await?;

    info!(user_id = %user.id, "user registered");

    let token = auth::create_token(&state.config.auth, user.id, &user.email)?;
    Ok(Json(AuthResponse {
        token: Token::bearer(token),
        user: user.into(),
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<ResponseJson<AuthResponse>> {
    let pool = state.pool.as_ref().ok_or(AppError::DatabaseUnavailable)?;

    let user = DatabaseOperations::get_user_by_email(pool, &request.email)
        .await?
        .ok_or_else(|| AppError::Auth("Incorrect email or password".to_string()))?;

    if !auth::verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Auth("Incorrect email or password".to_string()));
    }

    info!(user_id = %user.id, "user logged in");

    let token = auth::create_token(&state.config.auth, user.id, &user.email)?;
    Ok(Json(AuthResponse {
        token: Token::bearer(token),
        user: user.into(),
    }))
}

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<ResponseJson<UserResponse>> {
    let user = current_user(&state, &headers).await?;
    Ok(Json(user.into()))
}

async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<ResponseJson<serde_json::Value>> {
    let user = current_user(&state, &headers).await?;
    Ok(Json(serde_json::json!({
        "valid": true,
        "user_id": user.id,
        "email": user.email,
    })))
}

// Tokens are stateless; logout is a client-side discard.
async fn logout() -> ResponseJson<serde_json::Value> {
    Json(serde_json::json!({"message": "Successfully logged out"}))
}
