//! Service-rating endpoints

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Rating,
    services::ratings::RatingEligibility,
    AppState,
};

use super::{AuthenticatedUser, StaffUser};

/// Rating submission
#[derive(Deserialize, ToSchema)]
pub struct RateRequest {
    /// Stars, clamped to 1-5
    pub stars: u8,
    #[serde(default)]
    pub feedback: String,
    /// Client platform label, e.g. `Tablet` or `Mobile`
    #[serde(default)]
    pub platform: String,
}

#[derive(Serialize, ToSchema)]
pub struct ToggleRatingResponse {
    pub success: bool,
    /// New state of the global rating switch
    pub enabled: bool,
}

#[derive(Serialize, ToSchema)]
pub struct RateResponse {
    pub success: bool,
    pub message: String,
}

/// Flip the global rating switch
#[utoipa::path(
    post,
    path = "/admin/ratings/toggle",
    tag = "ratings",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Switch flipped", body = ToggleRatingResponse),
        (status = 403, description = "Staff only")
    )
)]
pub async fn toggle_rating(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<ToggleRatingResponse>> {
    let enabled = state.services.ratings.toggle().await?;
    Ok(Json(ToggleRatingResponse {
        success: true,
        enabled,
    }))
}

/// Whether the rating prompt should be shown to this member
#[utoipa::path(
    get,
    path = "/ratings/status/{school_id}",
    tag = "ratings",
    params(
        ("school_id" = String, Path, description = "Member school id")
    ),
    responses(
        (status = 200, description = "Prompt eligibility", body = RatingEligibility)
    )
)]
pub async fn rating_status(
    State(state): State<AppState>,
    Path(school_id): Path<String>,
) -> Json<RatingEligibility> {
    Json(state.services.ratings.eligibility(&school_id).await)
}

/// Submit a rating; the session token is re-checked against the member
#[utoipa::path(
    post,
    path = "/ratings",
    tag = "ratings",
    security(("session_token" = [])),
    request_body = RateRequest,
    responses(
        (status = 200, description = "Rating recorded", body = RateResponse),
        (status = 401, description = "Missing or mismatched session")
    )
)]
pub async fn rate(
    State(state): State<AppState>,
    AuthenticatedUser(school_id): AuthenticatedUser,
    headers: HeaderMap,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<RateResponse>> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|raw| raw.strip_prefix("Bearer ").unwrap_or(raw))
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    state
        .services
        .ratings
        .submit(
            &school_id,
            token,
            request.stars,
            &request.feedback,
            &request.platform,
        )
        .await?;

    Ok(Json(RateResponse {
        success: true,
        message: "Thanks for the feedback".to_string(),
    }))
}

/// Raw rating feed for the staff dashboard
#[utoipa::path(
    get,
    path = "/admin/ratings",
    tag = "ratings",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "All ratings", body = Vec<Rating>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn ratings_summary(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> Json<Vec<Rating>> {
    Json(state.services.ratings.summary().await)
}
