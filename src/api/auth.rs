//! Authentication endpoints

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::MemberProfile, AppState};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Member school id
    pub school_id: String,
    /// Plaintext password
    pub password: String,
}

/// Login response with session token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    /// Session token to send in the Authorization header
    pub token: String,
    pub user: MemberProfile,
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

/// Authenticate a member and open a session
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials or pending account"),
        (status = 404, description = "Unknown school id")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .members
        .login(&request.school_id, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        user,
    }))
}

/// Close the session owning the presented token
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Session closed", body = StatusResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<StatusResponse> {
    let revoked = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|raw| raw.strip_prefix("Bearer ").unwrap_or(raw))
        .map(|token| state.services.members.logout(token))
        .unwrap_or(false);

    Json(StatusResponse {
        success: true,
        message: if revoked {
            "Logged out".to_string()
        } else {
            "No active session".to_string()
        },
    })
}

/// Profile of the member behind the current session
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Current member profile", body = MemberProfile),
        (status = 401, description = "Missing or expired session")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(school_id): AuthenticatedUser,
) -> AppResult<Json<MemberProfile>> {
    let profile = state
        .services
        .members
        .find_any(&school_id)
        .await
        .ok_or_else(|| crate::error::AppError::NotFound("ID not found".to_string()))?;
    Ok(Json(profile))
}
