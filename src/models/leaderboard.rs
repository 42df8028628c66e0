//! Derived monthly leaderboard rows (recomputed per query, never persisted)

use serde::Serialize;
use utoipa::ToSchema;

/// One row of the monthly top-borrowers ranking
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopBorrower {
    /// 1-based rank
    pub rank: usize,
    pub school_id: String,
    pub name: String,
    pub photo: String,
    pub total_borrowed: usize,
    /// "<book_no> <title>" of the member's most frequent book this month
    pub most_borrowed_book: String,
}

/// One row of the monthly top-books ranking
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopBook {
    /// 1-based rank
    pub rank: usize,
    pub book_no: String,
    /// Falls back to the raw `book_no` when no inventory record matches
    pub title: String,
    pub total_borrowed: usize,
}

/// Both rankings are independent projections of the same filtered
/// transaction set.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyLeaderboard {
    pub top_borrowers: Vec<TopBorrower>,
    pub top_books: Vec<TopBook>,
}
