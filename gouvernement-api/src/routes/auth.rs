/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Register a new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh the access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, EMAIL_TAKEN},
};
use axum::{extract::State, http::StatusCode, Json};
use gouvernement_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 150, message = "First name must be between 1 and 150 characters"))]
    pub first_name: String,

    /// Checked against the strength rules after validation
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords don't match"))]
    pub password_confirm: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Tokens issued to a user
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: Uuid,

    #[serde(flatten)]
    pub tokens: jwt::TokenPair,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// ```text
/// POST /v1/auth/register
///
/// {
///   "email": "ada@example.com",
///   "first_name": "Ada",
///   "password": "Analyt1cal!",
///   "password_confirm": "Analyt1cal!"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed, weak password or email
///   already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    req.validate()?;
    password::validate_password_strength(&req.password)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::field("email", EMAIL_TAKEN));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            first_name: req.first_name,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let tokens = jwt::issue_pair(user.id, state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user_id: user.id,
            tokens,
        }),
    ))
}

/// Login
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Failed login attempt");
        return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
    }

    let tokens = jwt::issue_pair(user.id, state.jwt_secret())?;

    Ok(Json(SessionResponse {
        user_id: user.id,
        tokens,
    }))
}

/// Exchanges a refresh token for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}
