//! Circulation endpoints: reserve, borrow, return

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Transaction,
    AppState,
};

use super::{AuthenticatedUser, StaffUser};

/// Reservation request
#[derive(Deserialize, ToSchema)]
pub struct ReserveRequest {
    /// Book number to reserve
    pub book_no: String,
    /// Member the reservation is for; defaults to the session owner
    pub school_id: Option<String>,
    /// Planned pickup day (`YYYY-MM-DD`); holds the book until end of day
    pub pickup_date: Option<String>,
    /// Display name recorded on the reservation
    pub borrower_name: Option<String>,
}

/// Borrow/return dispatch request
#[derive(Deserialize, ToSchema)]
pub struct ProcessTransactionRequest {
    /// Either `borrow` or `return`
    pub action: String,
    pub book_no: String,
    /// Required for `borrow`
    pub school_id: Option<String>,
    /// Agreed return day (`YYYY-MM-DD`), required for `borrow`
    pub return_date: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CirculationResponse {
    pub success: bool,
    pub message: String,
}

/// Reserve a book
#[utoipa::path(
    post,
    path = "/circulation/reserve",
    tag = "circulation",
    security(("session_token" = [])),
    request_body = ReserveRequest,
    responses(
        (status = 201, description = "Reservation created", body = CirculationResponse),
        (status = 401, description = "Missing or expired session"),
        (status = 403, description = "Reserving for another member requires staff"),
        (status = 409, description = "Duplicate reservation, quota reached, or book unavailable")
    )
)]
pub async fn reserve(
    State(state): State<AppState>,
    AuthenticatedUser(session_owner): AuthenticatedUser,
    Json(request): Json<ReserveRequest>,
) -> AppResult<(StatusCode, Json<CirculationResponse>)> {
    let school_id = request.school_id.unwrap_or_else(|| session_owner.clone());

    // Members reserve for themselves; reserving on someone else's behalf
    // is a staff operation.
    if !crate::models::same_id(&school_id, &session_owner)
        && !state.services.members.is_staff(&session_owner).await
    {
        return Err(AppError::Authorization(
            "Cannot reserve for another member".to_string(),
        ));
    }

    state
        .services
        .circulation
        .reserve(
            &request.book_no,
            &school_id,
            request.pickup_date.as_deref(),
            request.borrower_name.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CirculationResponse {
            success: true,
            message: "Reservation created".to_string(),
        }),
    ))
}

/// Process a borrow or return at the circulation desk
#[utoipa::path(
    post,
    path = "/circulation/process",
    tag = "circulation",
    security(("session_token" = [])),
    request_body = ProcessTransactionRequest,
    responses(
        (status = 200, description = "Transaction processed", body = CirculationResponse),
        (status = 400, description = "Unknown action or missing fields"),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Book not reserved by this member")
    )
)]
pub async fn process_transaction(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(request): Json<ProcessTransactionRequest>,
) -> AppResult<Json<CirculationResponse>> {
    let message = match request.action.as_str() {
        "borrow" => {
            let school_id = request
                .school_id
                .as_deref()
                .ok_or_else(|| AppError::Validation("school_id is required".to_string()))?;
            let return_date = request
                .return_date
                .as_deref()
                .ok_or_else(|| AppError::Validation("Return date is required.".to_string()))?;
            state
                .services
                .circulation
                .borrow(&request.book_no, school_id, return_date)
                .await?;
            "Book borrowed"
        }
        "return" => {
            state
                .services
                .circulation
                .return_book(&request.book_no)
                .await?;
            "Book returned"
        }
        other => {
            return Err(AppError::Validation(format!("Unknown action: {other}")));
        }
    };

    Ok(Json(CirculationResponse {
        success: true,
        message: message.to_string(),
    }))
}

/// Full transaction log after a reconciliation pass
#[utoipa::path(
    get,
    path = "/circulation/transactions",
    tag = "circulation",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Transaction log", body = Vec<Transaction>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> Json<Vec<Transaction>> {
    Json(state.services.circulation.list_transactions().await)
}
