//! Reconciliation engine.
//!
//! Brings Book/Transaction/Ticket state in line with "now" before any read
//! or mutation is exposed:
//!
//! 1. expires unclaimed reservations (silent sweep, the paired book
//!    reverts to Available),
//! 2. flags overdue borrows as Unreturned on both sides of the pair,
//! 3. removes expired password-reset tickets.
//!
//! The pass is idempotent and safe to call on every listing request. A
//! record with an unparsable timestamp is skipped for that step only;
//! it never aborts reconciliation of the rest of the collection.

use chrono::NaiveDateTime;

use crate::{
    datetime,
    models::{same_id, Book, BookStatus, Ticket, Transaction, TransactionStatus},
    repository::Repository,
};

/// Result of one reconciliation pass over the three collections.
pub struct ReconcileOutcome {
    pub books: Vec<Book>,
    pub transactions: Vec<Transaction>,
    pub tickets: Vec<Ticket>,
    /// Step 1 or 2 mutated books/transactions
    pub circulation_changed: bool,
    /// Step 3 removed at least one ticket
    pub tickets_changed: bool,
}

/// Apply the time-based state transitions as of `now`. Pure with respect to
/// the store; persistence decisions belong to the caller.
pub fn reconcile_at(
    now: NaiveDateTime,
    mut books: Vec<Book>,
    transactions: Vec<Transaction>,
    tickets: Vec<Ticket>,
) -> ReconcileOutcome {
    let mut circulation_changed = false;

    // Step 1: sweep expired reservations. Expired reservations leave no
    // trace; the book goes back on the shelf.
    let mut active = Vec::with_capacity(transactions.len());
    for tx in transactions {
        if tx.status != TransactionStatus::Reserved {
            active.push(tx);
            continue;
        }
        let expired = match tx.reservation_expiry_at() {
            Some(expiry) => now > expiry,
            None => {
                if tx.reservation_expiry.is_some() || tx.expiry.is_some() {
                    tracing::warn!(
                        book_no = %tx.book_no,
                        "unparsable reservation expiry, treating reservation as active"
                    );
                }
                // Fail-safe: no parsable expiry means still active.
                false
            }
        };
        if expired {
            if let Some(book) = books
                .iter_mut()
                .find(|b| same_id(&b.book_no, &tx.book_no) && b.status == BookStatus::Reserved)
            {
                book.status = BookStatus::Available;
            }
            circulation_changed = true;
            continue;
        }
        active.push(tx);
    }
    let mut transactions = active;

    // Step 2: overdue detection. Strictly past the due date; due today is
    // not overdue. The transition is forward-only.
    for tx in &mut transactions {
        if tx.status != TransactionStatus::Borrowed {
            continue;
        }
        let due = match tx.return_date.as_deref() {
            Some(raw) => match datetime::parse_flexible(raw) {
                Some(due) => due,
                None => {
                    tracing::warn!(book_no = %tx.book_no, "unparsable due date, skipping overdue check");
                    continue;
                }
            },
            None => continue,
        };
        if now.date() > due.date() {
            tx.status = TransactionStatus::Unreturned;
            if let Some(book) = books.iter_mut().find(|b| same_id(&b.book_no, &tx.book_no)) {
                book.status = BookStatus::Unreturned;
            }
            circulation_changed = true;
        }
    }

    // Step 3: sweep expired tickets, regardless of their approval status.
    let before = tickets.len();
    let tickets: Vec<Ticket> = tickets
        .into_iter()
        .filter(|t| match datetime::parse_flexible(&t.expiry) {
            Some(expiry) => expiry > now,
            None => {
                tracing::warn!(school_id = %t.school_id, "unparsable ticket expiry, keeping ticket");
                true
            }
        })
        .collect();
    let tickets_changed = tickets.len() != before;

    ReconcileOutcome {
        books,
        transactions,
        tickets,
        circulation_changed,
        tickets_changed,
    }
}

#[derive(Clone)]
pub struct ReconcileService {
    repository: Repository,
}

impl ReconcileService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Run one reconciliation pass and return the current book collection.
    pub async fn run(&self) -> Vec<Book> {
        let _guard = self.repository.write_guard().await;
        self.run_locked().await
    }

    /// Reconcile while the caller already holds the store write lock.
    ///
    /// Persistence here is best-effort: a failed save is logged and the
    /// in-memory books are still returned, so a storage hiccup degrades
    /// durability rather than availability.
    pub(crate) async fn run_locked(&self) -> Vec<Book> {
        let books = self.repository.books.load_all().await;
        let transactions = self.repository.transactions.load_all().await;
        let tickets = self.repository.tickets.load_all().await;

        let outcome = reconcile_at(datetime::now(), books, transactions, tickets);

        if outcome.circulation_changed {
            if let Err(e) = self.repository.books.save_all(&outcome.books).await {
                tracing::error!("reconcile: failed to save books: {}", e);
            }
            if let Err(e) = self
                .repository
                .transactions
                .save_all(&outcome.transactions)
                .await
            {
                tracing::error!("reconcile: failed to save transactions: {}", e);
            }
        }
        if outcome.tickets_changed {
            if let Err(e) = self.repository.tickets.save_all(&outcome.tickets).await {
                tracing::error!("reconcile: failed to save tickets: {}", e);
            }
        }

        outcome.books
    }
}
