//! Reservation/borrow state machine.
//!
//! Legal transitions per book:
//! `Available → Reserved → Borrowed → {Returned | Unreturned → Returned}`,
//! with `Reserved → Available` also reachable via reservation expiry in the
//! reconciliation pass. `Returned` closes the cycle and the book goes back
//! to `Available`; the transaction itself becomes history.

use crate::{
    config::CirculationConfig,
    datetime,
    error::{AppError, AppResult},
    models::{normalize_id, same_id, BookStatus, Transaction, TransactionStatus},
    repository::Repository,
    services::reconcile::ReconcileService,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    reconcile: ReconcileService,
    config: CirculationConfig,
}

impl CirculationService {
    pub fn new(repository: Repository, config: CirculationConfig) -> Self {
        let reconcile = ReconcileService::new(repository.clone());
        Self {
            repository,
            reconcile,
            config,
        }
    }

    /// Reserve a book for a member.
    ///
    /// Guard order matters: the member's own conflicting state (duplicate
    /// reservation, quota) is reported before availability of the book.
    pub async fn reserve(
        &self,
        book_no: &str,
        school_id: &str,
        pickup_date: Option<&str>,
        borrower_name: Option<&str>,
    ) -> AppResult<()> {
        let book_no = book_no.trim();
        let school_id = normalize_id(school_id);
        if book_no.is_empty() || school_id.is_empty() {
            return Err(AppError::Validation(
                "book_no and school_id are required".to_string(),
            ));
        }

        let _guard = self.repository.write_guard().await;
        // Expired holds must be gone before the guards run.
        self.reconcile.run_locked().await;

        let mut books = self.repository.books.load_all().await;
        let mut transactions = self.repository.transactions.load_all().await;
        let now = datetime::now();

        let active_reservations: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Reserved && same_id(&t.school_id, &school_id))
            .collect();

        if active_reservations
            .iter()
            .any(|t| same_id(&t.book_no, book_no))
        {
            return Err(AppError::DuplicateReservation);
        }
        if active_reservations.len() >= self.config.max_active_reservations {
            return Err(AppError::QuotaExceeded(self.config.max_active_reservations));
        }

        let book = books
            .iter_mut()
            .find(|b| same_id(&b.book_no, book_no) && b.status == BookStatus::Available)
            .ok_or(AppError::Unavailable)?;

        book.status = BookStatus::Reserved;

        // A valid pickup day holds the book until the end of that day;
        // otherwise the reservation is a short walk-in hold.
        let pickup_day = pickup_date
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .and_then(datetime::parse_date);
        let expiry_at = match pickup_day {
            Some(day) => datetime::end_of_day(day),
            None => now + chrono::Duration::minutes(self.config.reservation_hold_minutes),
        };
        let expiry = expiry_at.format(datetime::TIMESTAMP_FORMAT).to_string();
        let reservation_start = now.format(datetime::TIMESTAMP_FORMAT).to_string();

        transactions.push(Transaction {
            book_no: book.book_no.clone(),
            title: Some(book.title.clone()),
            school_id,
            status: TransactionStatus::Reserved,
            date: Some(now.format(datetime::MINUTE_FORMAT).to_string()),
            transaction_date: None,
            reservation_start: Some(reservation_start),
            reservation_expiry: Some(expiry.clone()),
            expiry: Some(expiry),
            borrow_date: None,
            return_date: None,
            pickup_date: pickup_day.map(|d| d.format(datetime::DATE_FORMAT).to_string()),
            borrower_name: borrower_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        });

        self.repository.books.save_all(&books).await?;
        self.repository.transactions.save_all(&transactions).await?;
        tracing::info!(book_no = %book_no, "reservation created");
        Ok(())
    }

    /// Convert an existing reservation into a borrow. Walk-up immediate
    /// borrowing is not permitted; the (book, member) pair must hold an
    /// active reservation and the book itself must be in `Reserved`.
    pub async fn borrow(&self, book_no: &str, school_id: &str, return_date: &str) -> AppResult<()> {
        let book_no = book_no.trim();
        let school_id = normalize_id(school_id);
        let return_date = return_date.trim();
        if return_date.is_empty() {
            return Err(AppError::Validation("Return date is required.".to_string()));
        }
        let due = datetime::parse_date(return_date)
            .ok_or_else(|| AppError::Validation("Invalid return date format.".to_string()))?;

        let _guard = self.repository.write_guard().await;
        let mut books = self.repository.books.load_all().await;
        let mut transactions = self.repository.transactions.load_all().await;

        let book = books
            .iter_mut()
            .find(|b| same_id(&b.book_no, book_no))
            .ok_or(AppError::NotReserved)?;
        if book.status != BookStatus::Reserved {
            return Err(AppError::NotReserved);
        }
        let reservation = transactions
            .iter_mut()
            .find(|t| {
                t.status == TransactionStatus::Reserved
                    && same_id(&t.book_no, book_no)
                    && same_id(&t.school_id, &school_id)
            })
            .ok_or(AppError::NotReserved)?;

        let now = datetime::now();
        let borrow_date = now.format(datetime::MINUTE_FORMAT).to_string();
        reservation.status = TransactionStatus::Borrowed;
        reservation.borrow_date = Some(borrow_date.clone());
        reservation.date = Some(borrow_date);
        reservation.return_date = Some(due.format(datetime::DATE_FORMAT).to_string());
        reservation.reservation_start = None;
        reservation.reservation_expiry = None;
        reservation.expiry = None;
        book.status = BookStatus::Borrowed;

        self.repository.books.save_all(&books).await?;
        self.repository.transactions.save_all(&transactions).await?;
        tracing::info!(book_no = %book_no, "reservation converted to borrow");
        Ok(())
    }

    /// Blanket close-out of a book: every open transaction for it becomes
    /// `Returned` and the book goes back on the shelf. No member identity
    /// required; an unknown book is a no-op.
    pub async fn return_book(&self, book_no: &str) -> AppResult<()> {
        let book_no = book_no.trim();

        let _guard = self.repository.write_guard().await;
        let mut books = self.repository.books.load_all().await;
        let mut transactions = self.repository.transactions.load_all().await;

        let now = datetime::now().format(datetime::MINUTE_FORMAT).to_string();
        for book in books.iter_mut().filter(|b| same_id(&b.book_no, book_no)) {
            book.status = BookStatus::Available;
        }
        for tx in transactions
            .iter_mut()
            .filter(|t| t.status.is_active() && same_id(&t.book_no, book_no))
        {
            tx.status = TransactionStatus::Returned;
            tx.return_date = Some(now.clone());
        }

        self.repository.books.save_all(&books).await?;
        self.repository.transactions.save_all(&transactions).await?;
        tracing::info!(book_no = %book_no, "book returned");
        Ok(())
    }

    /// Current transaction log, reconciled first.
    pub async fn list_transactions(&self) -> Vec<Transaction> {
        let _guard = self.repository.write_guard().await;
        self.reconcile.run_locked().await;
        self.repository.transactions.load_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;

    async fn fixture(books: &[(&str, BookStatus)]) -> (tempfile::TempDir, CirculationService, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path()).await.unwrap();
        let records: Vec<Book> = books
            .iter()
            .map(|(no, status)| Book {
                book_no: no.to_string(),
                title: format!("Title {}", no),
                category: "General".to_string(),
                status: *status,
            })
            .collect();
        repo.books.save_all(&records).await.unwrap();
        let service = CirculationService::new(repo.clone(), CirculationConfig::default());
        (dir, service, repo)
    }

    #[tokio::test]
    async fn reserve_marks_book_and_creates_transaction() {
        let (_dir, service, repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service.reserve("b1", "Alice", None, None).await.unwrap();

        let books = repo.books.load_all().await;
        assert_eq!(books[0].status, BookStatus::Reserved);

        let txs = repo.transactions.load_all().await;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].book_no, "B1");
        assert_eq!(txs[0].school_id, "alice");
        assert_eq!(txs[0].status, TransactionStatus::Reserved);
        assert!(txs[0].pickup_date.is_none());

        // Walk-in hold expires roughly 30 minutes out.
        let expiry = txs[0].reservation_expiry_at().unwrap();
        let held_for = expiry - datetime::now();
        assert!(held_for > chrono::Duration::minutes(29));
        assert!(held_for <= chrono::Duration::minutes(30));
    }

    #[tokio::test]
    async fn reserve_with_pickup_date_holds_until_end_of_day() {
        let (_dir, service, repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service
            .reserve("B1", "alice", Some("2099-01-15"), Some("Alice A."))
            .await
            .unwrap();

        let txs = repo.transactions.load_all().await;
        assert_eq!(txs[0].pickup_date.as_deref(), Some("2099-01-15"));
        assert_eq!(
            txs[0].reservation_expiry.as_deref(),
            Some("2099-01-15 23:59:59")
        );
        assert_eq!(txs[0].borrower_name.as_deref(), Some("Alice A."));
    }

    #[tokio::test]
    async fn invalid_pickup_date_falls_back_to_walk_in_hold() {
        let (_dir, service, repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service
            .reserve("B1", "alice", Some("15/01/2099"), None)
            .await
            .unwrap();

        let txs = repo.transactions.load_all().await;
        assert!(txs[0].pickup_date.is_none());
        let held_for = txs[0].reservation_expiry_at().unwrap() - datetime::now();
        assert!(held_for <= chrono::Duration::minutes(30));
    }

    #[tokio::test]
    async fn duplicate_reservation_is_reported_before_availability() {
        let (_dir, service, _repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service.reserve("B1", "alice", None, None).await.unwrap();

        // Same member, same book, different casing: their own conflict wins
        // over the book now being unavailable.
        let err = service.reserve(" b1 ", "ALICE", None, None).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateReservation));
    }

    #[tokio::test]
    async fn sixth_reservation_hits_the_quota_even_for_an_available_book() {
        let (_dir, service, _repo) = fixture(&[
            ("B1", BookStatus::Available),
            ("B2", BookStatus::Available),
            ("B3", BookStatus::Available),
            ("B4", BookStatus::Available),
            ("B5", BookStatus::Available),
            ("B6", BookStatus::Available),
        ])
        .await;
        for no in ["B1", "B2", "B3", "B4", "B5"] {
            service.reserve(no, "alice", None, None).await.unwrap();
        }
        let err = service.reserve("B6", "alice", None, None).await.unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded(5)));

        // A different member is unaffected by alice's quota.
        service.reserve("B6", "bob", None, None).await.unwrap();
    }

    #[tokio::test]
    async fn reserving_a_non_available_book_fails_as_unavailable() {
        let (_dir, service, _repo) = fixture(&[("B1", BookStatus::Borrowed)]).await;
        let err = service.reserve("B1", "alice", None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable));

        let err = service.reserve("NOPE", "alice", None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable));
    }

    #[tokio::test]
    async fn second_member_cannot_stack_a_reservation_on_a_reserved_book() {
        let (_dir, service, repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service.reserve("B1", "alice", None, None).await.unwrap();
        let err = service.reserve("B1", "bob", None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable));

        // One active transaction per book_no at all times.
        let active = repo
            .transactions
            .load_all()
            .await
            .into_iter()
            .filter(|t| t.status.is_active())
            .count();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn expired_hold_is_swept_before_the_guards_run() {
        let (_dir, service, repo) = fixture(&[("B1", BookStatus::Reserved)]).await;
        let mut stale = Transaction {
            book_no: "B1".to_string(),
            title: None,
            school_id: "alice".to_string(),
            status: TransactionStatus::Reserved,
            date: None,
            transaction_date: None,
            reservation_start: None,
            reservation_expiry: Some("2020-01-01 00:00:00".to_string()),
            expiry: None,
            borrow_date: None,
            return_date: None,
            pickup_date: None,
            borrower_name: None,
        };
        stale.title = Some("Title B1".to_string());
        repo.transactions.save_all(&[stale]).await.unwrap();

        // alice's stale hold no longer blocks bob.
        service.reserve("B1", "bob", None, None).await.unwrap();
        let txs = repo.transactions.load_all().await;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].school_id, "bob");
    }

    #[tokio::test]
    async fn borrow_requires_a_prior_reservation() {
        let (_dir, service, _repo) = fixture(&[("B1", BookStatus::Available)]).await;
        let err = service.borrow("B1", "alice", "2099-01-01").await.unwrap_err();
        assert!(matches!(err, AppError::NotReserved));
    }

    #[tokio::test]
    async fn borrow_rejects_someone_elses_reservation() {
        let (_dir, service, _repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service.reserve("B1", "alice", None, None).await.unwrap();
        let err = service.borrow("B1", "bob", "2099-01-01").await.unwrap_err();
        assert!(matches!(err, AppError::NotReserved));
    }

    #[tokio::test]
    async fn borrow_rejects_a_missing_or_malformed_due_date() {
        let (_dir, service, _repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service.reserve("B1", "alice", None, None).await.unwrap();

        let err = service.borrow("B1", "alice", "  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = service.borrow("B1", "alice", "01-01-2099").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn borrow_converts_the_reservation_in_place() {
        let (_dir, service, repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service
            .reserve("B1", "alice", Some("2099-01-15"), None)
            .await
            .unwrap();
        service.borrow("b1", "ALICE", "2099-02-01").await.unwrap();

        let books = repo.books.load_all().await;
        assert_eq!(books[0].status, BookStatus::Borrowed);

        let txs = repo.transactions.load_all().await;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].status, TransactionStatus::Borrowed);
        assert_eq!(txs[0].return_date.as_deref(), Some("2099-02-01"));
        assert!(txs[0].borrow_date.is_some());
        assert!(txs[0].reservation_start.is_none());
        assert!(txs[0].reservation_expiry.is_none());
        assert!(txs[0].expiry.is_none());
    }

    #[tokio::test]
    async fn return_closes_every_open_transaction_for_the_book() {
        let (_dir, service, repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service.reserve("B1", "alice", None, None).await.unwrap();
        service.borrow("B1", "alice", "2099-02-01").await.unwrap();
        service.return_book("b1").await.unwrap();

        let books = repo.books.load_all().await;
        assert_eq!(books[0].status, BookStatus::Available);

        let txs = repo.transactions.load_all().await;
        assert_eq!(txs[0].status, TransactionStatus::Returned);
        assert!(txs[0].return_date.is_some());

        // Returned transactions are history: the book can circulate again.
        service.reserve("B1", "bob", None, None).await.unwrap();
    }

    #[tokio::test]
    async fn returning_an_unknown_book_is_a_no_op() {
        let (_dir, service, _repo) = fixture(&[]).await;
        service.return_book("GHOST").await.unwrap();
    }

    #[tokio::test]
    async fn overdue_borrow_surfaces_as_unreturned_in_listings() {
        let (_dir, service, repo) = fixture(&[("B1", BookStatus::Available)]).await;
        service.reserve("B1", "alice", None, None).await.unwrap();
        service.borrow("B1", "alice", "2020-01-01").await.unwrap();

        let txs = service.list_transactions().await;
        assert_eq!(txs[0].status, TransactionStatus::Unreturned);
        assert_eq!(repo.books.load_all().await[0].status, BookStatus::Unreturned);

        // An explicit return clears the overdue state.
        service.return_book("B1").await.unwrap();
        assert_eq!(repo.books.load_all().await[0].status, BookStatus::Available);
    }
}
