//! API handlers for LBAS REST endpoints

pub mod auth;
pub mod books;
pub mod circulation;
pub mod health;
pub mod leaderboard;
pub mod members;
pub mod openapi;
pub mod ratings;
pub mod tickets;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, AppState};

/// Extractor for the authenticated member behind a session token.
///
/// The token travels in the `Authorization` header, with or without a
/// `Bearer ` prefix. Carries the normalized school id of the session owner.
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);

        let school_id = state
            .services
            .sessions
            .find_by_token(token)
            .ok_or_else(|| AppError::Authentication("Invalid or expired session".to_string()))?;

        Ok(AuthenticatedUser(school_id))
    }
}

/// Extractor for staff-only endpoints. Validates the session and then
/// requires the owner to be in the staff registry.
pub struct StaffUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(school_id) =
            AuthenticatedUser::from_request_parts(parts, state).await?;

        if !state.services.members.is_staff(&school_id).await {
            return Err(AppError::Authorization(
                "Staff privileges required".to_string(),
            ));
        }

        Ok(StaffUser(school_id))
    }
}
