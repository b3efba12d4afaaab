//! Account handlers: registration, sign-in and token lifecycle.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use common::AppResult;
use domain::EmployeeResponse;
use token_service_lib::service::{RegisterEmployee, TokenResponse};

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Employee self-registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address, also used as the user name
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    /// Password checked against the configured password policy
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "V0lunteer$")]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    #[schema(example = "Jane")]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    #[schema(example = "Doe")]
    pub last_name: String,
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// User name or email
    #[validate(length(min = 1, message = "User name is required"))]
    #[schema(example = "defaultAdmin@aiminspections.com")]
    pub user_name: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "V0lunteer$")]
    pub password: String,
}

/// Refresh token exchange request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Token pair returned after sign-in or refresh
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    /// JWT access token
    pub access_token: String,
    /// Single-use refresh token
    pub refresh_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl From<TokenResponse> for TokenPairResponse {
    fn from(tokens: TokenResponse) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        }
    }
}

/// Create public account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

/// Create account routes that need an authenticated employee
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}

/// Register a new employee in the `user` role
#[utoipa::path(
    post,
    path = "/api/account/register",
    tag = "Account",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Employee registered", body = EmployeeResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User name or email already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<EmployeeResponse>)> {
    let scope = state.scope(None);
    let employee = state
        .tokens(&scope)
        .register(RegisterEmployee {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(EmployeeResponse::from(employee))))
}

/// Sign in and get a token pair
#[utoipa::path(
    post,
    path = "/api/account/login",
    tag = "Account",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenPairResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Locked out or not allowed")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let scope = state.scope(None);
    let tokens = state
        .tokens(&scope)
        .sign_in(&payload.user_name, &payload.password)
        .await?;

    Ok(Json(tokens.into()))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/account/refresh",
    tag = "Account",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = TokenPairResponse),
        (status = 401, description = "Refresh token invalid, expired or used")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let scope = state.scope(None);
    let tokens = state.tokens(&scope).refresh(&payload.refresh_token).await?;

    Ok(Json(tokens.into()))
}

/// Revoke every refresh token of the current employee
#[utoipa::path(
    post,
    path = "/api/account/logout",
    tag = "Account",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn logout(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    let scope = state.scope(Some(&current_user));
    state.tokens(&scope).sign_out(&current_user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
