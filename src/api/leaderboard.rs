//! Monthly leaderboard endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{MonthlyLeaderboard, TopBook, TopBorrower},
    services::leaderboard::DEFAULT_LIMIT,
    AppState,
};

use super::StaffUser;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaderboardQuery {
    /// Maximum rows per ranking (default 10)
    pub limit: Option<usize>,
}

/// Both rankings for the current calendar month
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    security(("session_token" = [])),
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Monthly leaderboard", body = MonthlyLeaderboard),
        (status = 403, description = "Staff only")
    )
)]
pub async fn monthly_leaderboard(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(query): Query<LeaderboardQuery>,
) -> Json<MonthlyLeaderboard> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Json(state.services.leaderboard.monthly(limit).await)
}

/// Public ranking of this month's most active borrowers
#[utoipa::path(
    get,
    path = "/leaderboard/top-borrowers",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Top borrowers this month", body = Vec<TopBorrower>)
    )
)]
pub async fn top_borrowers(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<Vec<TopBorrower>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Json(state.services.leaderboard.monthly(limit).await.top_borrowers)
}

/// Staff-only ranking of this month's most borrowed books
#[utoipa::path(
    get,
    path = "/leaderboard/top-books",
    tag = "leaderboard",
    security(("session_token" = [])),
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Top books this month", body = Vec<TopBook>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn top_books(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(query): Query<LeaderboardQuery>,
) -> Json<Vec<TopBook>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Json(state.services.leaderboard.monthly(limit).await.top_books)
}

/// One member's card for the current month, ranked or zero-count
#[utoipa::path(
    get,
    path = "/leaderboard/profile/{school_id}",
    tag = "leaderboard",
    params(
        ("school_id" = String, Path, description = "Member school id")
    ),
    responses(
        (status = 200, description = "Member's monthly card", body = TopBorrower),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn leaderboard_profile(
    State(state): State<AppState>,
    Path(school_id): Path<String>,
) -> AppResult<Json<TopBorrower>> {
    let card = state.services.leaderboard.profile(&school_id).await?;
    Ok(Json(card))
}
