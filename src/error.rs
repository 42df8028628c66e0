//! Error types for the LBAS server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    StoreFailure = 3,
    NoSuchMember = 4,
    NoSuchBook = 5,
    BookUnavailable = 6,
    DuplicateReservation = 7,
    ReservationQuotaReached = 8,
    NotReserved = 9,
    BadValue = 10,
    Duplicate = 11,
    InvalidResetCode = 12,
    AccountPending = 13,
    NoSuchData = 14,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Account pending approval")]
    AccountPending,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unavailable")]
    Unavailable,

    #[error("You already have an active reservation for this book.")]
    DuplicateReservation,

    #[error("Reservation limit reached ({0} max).")]
    QuotaExceeded(usize),

    #[error("Book must be reserved before borrowing.")]
    NotReserved,

    #[error("Invalid or expired reset code")]
    InvalidResetCode,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::AccountPending => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::AccountPending,
                self.to_string(),
            ),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Unavailable => (
                StatusCode::CONFLICT,
                ErrorCode::BookUnavailable,
                self.to_string(),
            ),
            AppError::DuplicateReservation => (
                StatusCode::CONFLICT,
                ErrorCode::DuplicateReservation,
                self.to_string(),
            ),
            AppError::QuotaExceeded(_) => (
                StatusCode::CONFLICT,
                ErrorCode::ReservationQuotaReached,
                self.to_string(),
            ),
            AppError::NotReserved => (
                StatusCode::CONFLICT,
                ErrorCode::NotReserved,
                self.to_string(),
            ),
            AppError::InvalidResetCode => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::InvalidResetCode,
                self.to_string(),
            ),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StoreFailure,
                    "Storage error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
