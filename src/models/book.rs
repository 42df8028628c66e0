//! Book record and circulation status

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Circulation status of a book. `Unreturned` marks an overdue borrow and
/// is only ever set by the reconciliation pass; it is cleared by an
/// explicit return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookStatus {
    Available,
    Reserved,
    Borrowed,
    Unreturned,
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BookStatus::Available => "Available",
            BookStatus::Reserved => "Reserved",
            BookStatus::Borrowed => "Borrowed",
            BookStatus::Unreturned => "Unreturned",
        };
        write!(f, "{}", label)
    }
}

/// One inventory record per `book_no`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Natural key, stored upper-cased, compared case-insensitively
    pub book_no: String,
    pub title: String,
    pub category: String,
    pub status: BookStatus,
}
