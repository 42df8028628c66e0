//! Password-reset ticket endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::Ticket,
    services::tickets::TicketPoll,
    AppState,
};

use super::StaffUser;

/// Reset request: opens (or replaces) a ticket for the member
#[derive(Deserialize, ToSchema)]
pub struct ResetRequest {
    pub school_id: String,
}

/// Final reset step: one-time code plus the new password
#[derive(Deserialize, ToSchema)]
pub struct FinalizeResetRequest {
    pub school_id: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Serialize, ToSchema)]
pub struct TicketStatusResponse {
    pub success: bool,
    pub message: String,
}

/// Approval response carrying the one-time code for the staff to hand over
#[derive(Serialize, ToSchema)]
pub struct ApproveTicketResponse {
    pub success: bool,
    pub code: String,
}

/// Open a password-reset ticket
#[utoipa::path(
    post,
    path = "/tickets",
    tag = "tickets",
    request_body = ResetRequest,
    responses(
        (status = 201, description = "Ticket opened", body = TicketStatusResponse),
        (status = 404, description = "Unknown school id")
    )
)]
pub async fn request_reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> AppResult<(StatusCode, Json<TicketStatusResponse>)> {
    state.services.tickets.request_ticket(&request.school_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(TicketStatusResponse {
            success: true,
            message: "Ticket opened; ask library staff to approve it".to_string(),
        }),
    ))
}

/// Poll the ticket for this member; returns the code once approved
#[utoipa::path(
    get,
    path = "/tickets/{school_id}",
    tag = "tickets",
    params(
        ("school_id" = String, Path, description = "Member school id")
    ),
    responses(
        (status = 200, description = "Current ticket state", body = TicketPoll)
    )
)]
pub async fn poll_ticket(
    State(state): State<AppState>,
    Path(school_id): Path<String>,
) -> Json<TicketPoll> {
    Json(state.services.tickets.poll_ticket(&school_id).await)
}

/// List open tickets for the staff desk
#[utoipa::path(
    get,
    path = "/admin/tickets",
    tag = "tickets",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Open tickets", body = Vec<Ticket>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> Json<Vec<Ticket>> {
    Json(state.services.tickets.list_tickets().await)
}

/// Approve a ticket and mint its one-time code
#[utoipa::path(
    post,
    path = "/admin/tickets/{school_id}/approve",
    tag = "tickets",
    security(("session_token" = [])),
    params(
        ("school_id" = String, Path, description = "Member school id")
    ),
    responses(
        (status = 200, description = "Ticket approved", body = ApproveTicketResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "No open ticket for this member")
    )
)]
pub async fn approve_ticket(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(school_id): Path<String>,
) -> AppResult<Json<ApproveTicketResponse>> {
    let code = state.services.tickets.approve_ticket(&school_id).await?;
    Ok(Json(ApproveTicketResponse {
        success: true,
        code,
    }))
}

/// Redeem the one-time code and set the new password
#[utoipa::path(
    post,
    path = "/tickets/finalize",
    tag = "tickets",
    request_body = FinalizeResetRequest,
    responses(
        (status = 200, description = "Password updated", body = TicketStatusResponse),
        (status = 401, description = "Invalid or expired reset code")
    )
)]
pub async fn finalize_reset(
    State(state): State<AppState>,
    Json(request): Json<FinalizeResetRequest>,
) -> AppResult<Json<TicketStatusResponse>> {
    state
        .services
        .tickets
        .finalize_reset(&request.school_id, &request.code, &request.new_password)
        .await?;
    Ok(Json(TicketStatusResponse {
        success: true,
        message: "Password updated".to_string(),
    }))
}
