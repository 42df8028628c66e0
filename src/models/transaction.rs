//! Transaction record: one reservation-to-return lifecycle for one
//! (book, member) pair

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::datetime;

/// Lifecycle status of a transaction. `Returned` is terminal; everything
/// else counts as active and pairs one-to-one with the book's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TransactionStatus {
    Reserved,
    Borrowed,
    Unreturned,
    Returned,
}

impl TransactionStatus {
    /// A transaction is active until it reaches `Returned`.
    pub fn is_active(self) -> bool {
        !matches!(self, TransactionStatus::Returned)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransactionStatus::Reserved => "Reserved",
            TransactionStatus::Borrowed => "Borrowed",
            TransactionStatus::Unreturned => "Unreturned",
            TransactionStatus::Returned => "Returned",
        };
        write!(f, "{}", label)
    }
}

/// Transaction record as persisted in `transactions.json`. Timestamps are
/// strings in one of the three accepted formats; optional fields are only
/// serialized when present so records keep the shape older tooling expects.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub book_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub school_id: String,
    pub status: TransactionStatus,
    /// Display-facing date of the last state change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Preferred over `date` when computing the effective date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_expiry: Option<String>,
    /// Legacy duplicate of `reservation_expiry`, honoured as a fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrow_date: Option<String>,
    /// Due date while Borrowed; actual return timestamp once Returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrower_name: Option<String>,
}

impl Transaction {
    /// Reservation expiry instant, if one is recorded and parsable.
    pub fn reservation_expiry_at(&self) -> Option<NaiveDateTime> {
        let raw = self.reservation_expiry.as_deref().or(self.expiry.as_deref())?;
        datetime::parse_flexible(raw)
    }

    /// Effective date for aggregation: `transaction_date` first, then `date`.
    pub fn effective_date(&self) -> Option<NaiveDateTime> {
        let raw = self.transaction_date.as_deref().or(self.date.as_deref())?;
        datetime::parse_flexible(raw)
    }
}
