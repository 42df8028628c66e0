//! Data models for the LBAS record collections

pub mod book;
pub mod leaderboard;
pub mod member;
pub mod rating;
pub mod system;
pub mod ticket;
pub mod transaction;

// Re-export commonly used types
pub use book::{Book, BookStatus};
pub use leaderboard::{MonthlyLeaderboard, TopBook, TopBorrower};
pub use member::{Member, MemberProfile, MemberStatus};
pub use rating::Rating;
pub use system::SystemConfig;
pub use ticket::{Ticket, TicketStatus};
pub use transaction::{Transaction, TransactionStatus};

/// Canonical form of `school_id` and `book_no` for comparisons: trimmed and
/// lower-cased. Natural keys are compared case-insensitively everywhere.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// True when the two identifiers refer to the same natural key.
pub fn same_id(a: &str, b: &str) -> bool {
    normalize_id(a) == normalize_id(b)
}
