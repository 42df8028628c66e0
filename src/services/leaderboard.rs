//! Monthly leaderboard aggregator.
//!
//! Pure read-side projection recomputed on every call: transactions from
//! the current calendar month with status Borrowed or Returned feed two
//! independent rankings, top borrowers and top books. No cached state, so
//! no staleness, at the cost of a full scan per query.

use indexmap::IndexMap;

use crate::{
    datetime,
    error::{AppError, AppResult},
    models::{
        normalize_id, same_id, Member, MonthlyLeaderboard, TopBook, TopBorrower, Transaction,
        TransactionStatus,
    },
    repository::Repository,
};
use chrono::Datelike;

pub const DEFAULT_LIMIT: usize = 10;

struct BorrowerAgg {
    school_id: String,
    total: usize,
    /// normalized book_no -> (first-encountered raw book_no, count)
    books: IndexMap<String, (String, usize)>,
}

#[derive(Clone)]
pub struct LeaderboardService {
    repository: Repository,
}

impl LeaderboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Compute both rankings for the current calendar month.
    pub async fn monthly(&self, limit: usize) -> MonthlyLeaderboard {
        let now = datetime::now();
        let transactions = self.repository.transactions.load_all().await;
        let books = self.repository.books.load_all().await;

        // Borrowed and Returned both count as "engaged with this book this
        // month"; the effective date prefers transaction_date over date.
        let monthly: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| {
                matches!(
                    t.status,
                    TransactionStatus::Borrowed | TransactionStatus::Returned
                )
            })
            .filter(|t| {
                t.effective_date()
                    .map(|d| d.year() == now.year() && d.month() == now.month())
                    .unwrap_or(false)
            })
            .collect();

        let title_by_book: IndexMap<String, &str> = books
            .iter()
            .map(|b| (normalize_id(&b.book_no), b.title.as_str()))
            .collect();

        let profiles = self.identity_registry().await;

        // Top borrowers: group by member, insertion order preserved so that
        // favourite-book ties go to whichever book was encountered first.
        let mut borrowers: IndexMap<String, BorrowerAgg> = IndexMap::new();
        for tx in &monthly {
            let sid = tx.school_id.trim();
            let book_no = tx.book_no.trim();
            if sid.is_empty() || book_no.is_empty() {
                continue;
            }
            let agg = borrowers
                .entry(normalize_id(sid))
                .or_insert_with(|| BorrowerAgg {
                    school_id: sid.to_string(),
                    total: 0,
                    books: IndexMap::new(),
                });
            agg.total += 1;
            let slot = agg
                .books
                .entry(normalize_id(book_no))
                .or_insert_with(|| (book_no.to_string(), 0));
            slot.1 += 1;
        }

        let mut ranked: Vec<BorrowerAgg> = borrowers.into_values().collect();
        ranked.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| normalize_id(&a.school_id).cmp(&normalize_id(&b.school_id)))
        });
        ranked.truncate(limit);

        let top_borrowers = ranked
            .into_iter()
            .enumerate()
            .map(|(idx, agg)| {
                let profile = profiles.get(&normalize_id(&agg.school_id));
                let favourite = agg
                    .books
                    .values()
                    .fold(None::<&(String, usize)>, |best, candidate| match best {
                        Some(b) if b.1 >= candidate.1 => Some(b),
                        _ => Some(candidate),
                    });
                let most_borrowed_book = match favourite {
                    Some((book_no, _)) => {
                        let title = title_by_book
                            .get(&normalize_id(book_no))
                            .copied()
                            .filter(|t| !t.is_empty())
                            .unwrap_or(book_no.as_str());
                        format!("{} {}", book_no, title).trim().to_string()
                    }
                    None => "No records".to_string(),
                };
                TopBorrower {
                    rank: idx + 1,
                    school_id: agg.school_id.clone(),
                    name: profile
                        .map(|p| p.name.clone())
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| agg.school_id.clone()),
                    photo: profile
                        .map(|p| p.photo.clone())
                        .filter(|p| !p.is_empty())
                        .unwrap_or_else(Member::default_photo),
                    total_borrowed: agg.total,
                    most_borrowed_book,
                }
            })
            .collect();

        // Top books: an independent projection of the same filtered set.
        let mut book_counts: IndexMap<String, (String, usize)> = IndexMap::new();
        for tx in &monthly {
            let book_no = tx.book_no.trim();
            if book_no.is_empty() {
                continue;
            }
            let slot = book_counts
                .entry(normalize_id(book_no))
                .or_insert_with(|| (book_no.to_string(), 0));
            slot.1 += 1;
        }
        let mut book_rows: Vec<(String, usize)> = book_counts.into_values().collect();
        book_rows.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| normalize_id(&a.0).cmp(&normalize_id(&b.0)))
        });
        book_rows.truncate(limit);

        let top_books = book_rows
            .into_iter()
            .enumerate()
            .map(|(idx, (book_no, total))| {
                let title = title_by_book
                    .get(&normalize_id(&book_no))
                    .copied()
                    .filter(|t| !t.is_empty())
                    .unwrap_or(book_no.as_str())
                    .to_string();
                TopBook {
                    rank: idx + 1,
                    book_no,
                    title,
                    total_borrowed: total,
                }
            })
            .collect();

        MonthlyLeaderboard {
            top_borrowers,
            top_books,
        }
    }

    /// Leaderboard card for one member: their ranking row this month, or a
    /// zero-count fallback built from the identity registry.
    pub async fn profile(&self, school_id: &str) -> AppResult<TopBorrower> {
        let school_id = school_id.trim();
        if school_id.is_empty() {
            return Err(AppError::Validation("Missing school_id".to_string()));
        }

        let leaderboard = self.monthly(usize::MAX).await;
        if let Some(row) = leaderboard
            .top_borrowers
            .into_iter()
            .find(|r| same_id(&r.school_id, school_id))
        {
            return Ok(row);
        }

        let profiles = self.identity_registry().await;
        let member = profiles
            .get(&normalize_id(school_id))
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        Ok(TopBorrower {
            rank: 0,
            school_id: member.school_id.clone(),
            name: member.name.clone(),
            photo: member.photo.clone(),
            total_borrowed: 0,
            most_borrowed_book: "No records".to_string(),
        })
    }

    /// Combined member+staff identity registry; the student entry wins when
    /// an id improbably exists in both.
    async fn identity_registry(&self) -> IndexMap<String, Member> {
        let mut profiles: IndexMap<String, Member> = IndexMap::new();
        let students = self.repository.students.load_all().await;
        let staff = self.repository.staff.load_all().await;
        for member in students.into_iter().chain(staff) {
            let key = normalize_id(&member.school_id);
            if key.is_empty() {
                continue;
            }
            profiles.entry(key).or_insert(member);
        }
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, BookStatus, MemberStatus};

    fn this_month(day_offset: i64) -> String {
        // A timestamp safely inside the current month.
        let today = datetime::now().date();
        let day = today.with_day(1).unwrap() + chrono::Duration::days(day_offset);
        day.and_hms_opt(10, 0, 0)
            .unwrap()
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    fn tx(book_no: &str, sid: &str, status: TransactionStatus, date: &str) -> Transaction {
        Transaction {
            book_no: book_no.to_string(),
            title: None,
            school_id: sid.to_string(),
            status,
            date: Some(date.to_string()),
            transaction_date: None,
            reservation_start: None,
            reservation_expiry: None,
            expiry: None,
            borrow_date: None,
            return_date: None,
            pickup_date: None,
            borrower_name: None,
        }
    }

    async fn fixture() -> (tempfile::TempDir, LeaderboardService, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path()).await.unwrap();
        let service = LeaderboardService::new(repo.clone());
        (dir, service, repo)
    }

    #[tokio::test]
    async fn ranks_borrowers_by_monthly_engagement() {
        let (_dir, service, repo) = fixture().await;
        let d = this_month(0);
        repo.transactions
            .save_all(&[
                tx("B1", "alice", TransactionStatus::Borrowed, &d),
                tx("B1", "alice", TransactionStatus::Borrowed, &d),
                tx("B1", "alice", TransactionStatus::Borrowed, &d),
                tx("B2", "bob", TransactionStatus::Returned, &d),
            ])
            .await
            .unwrap();

        let board = service.monthly(10).await;
        assert_eq!(board.top_borrowers.len(), 2);
        assert_eq!(board.top_borrowers[0].school_id, "alice");
        assert_eq!(board.top_borrowers[0].rank, 1);
        assert_eq!(board.top_borrowers[0].total_borrowed, 3);
        assert_eq!(board.top_borrowers[1].school_id, "bob");
        assert_eq!(board.top_borrowers[1].total_borrowed, 1);
    }

    #[tokio::test]
    async fn excludes_other_months_reservations_and_unparsable_dates() {
        let (_dir, service, repo) = fixture().await;
        let d = this_month(0);
        repo.transactions
            .save_all(&[
                tx("B1", "alice", TransactionStatus::Borrowed, &d),
                tx("B2", "alice", TransactionStatus::Reserved, &d),
                tx("B3", "alice", TransactionStatus::Unreturned, &d),
                tx("B4", "alice", TransactionStatus::Borrowed, "1999-01-05 10:00"),
                tx("B5", "alice", TransactionStatus::Borrowed, "someday"),
            ])
            .await
            .unwrap();

        let board = service.monthly(10).await;
        assert_eq!(board.top_borrowers.len(), 1);
        assert_eq!(board.top_borrowers[0].total_borrowed, 1);
        assert_eq!(board.top_books.len(), 1);
        assert_eq!(board.top_books[0].book_no, "B1");
    }

    #[tokio::test]
    async fn count_ties_break_on_case_insensitive_id() {
        let (_dir, service, repo) = fixture().await;
        let d = this_month(0);
        repo.transactions
            .save_all(&[
                tx("B1", "Zoe", TransactionStatus::Borrowed, &d),
                tx("B2", "amir", TransactionStatus::Borrowed, &d),
            ])
            .await
            .unwrap();

        let board = service.monthly(10).await;
        assert_eq!(board.top_borrowers[0].school_id, "amir");
        assert_eq!(board.top_borrowers[1].school_id, "Zoe");
    }

    #[tokio::test]
    async fn favourite_book_ties_go_to_the_first_encountered() {
        let (_dir, service, repo) = fixture().await;
        let d = this_month(0);
        repo.transactions
            .save_all(&[
                tx("B2", "alice", TransactionStatus::Borrowed, &d),
                tx("B1", "alice", TransactionStatus::Borrowed, &d),
            ])
            .await
            .unwrap();

        let board = service.monthly(10).await;
        assert!(board.top_borrowers[0]
            .most_borrowed_book
            .starts_with("B2"));
    }

    #[tokio::test]
    async fn resolves_identity_and_book_titles() {
        let (_dir, service, repo) = fixture().await;
        repo.students
            .save_all(&[Member {
                name: "Alice Liddell".to_string(),
                school_id: "alice".to_string(),
                password: "pw".to_string(),
                category: "Student".to_string(),
                photo: "alice.png".to_string(),
                status: MemberStatus::Approved,
                created_at: None,
            }])
            .await
            .unwrap();
        repo.books
            .save_all(&[Book {
                book_no: "B1".to_string(),
                title: "Wonderland".to_string(),
                category: "Literature".to_string(),
                status: BookStatus::Available,
            }])
            .await
            .unwrap();
        let d = this_month(0);
        repo.transactions
            .save_all(&[
                tx("b1", "ALICE", TransactionStatus::Returned, &d),
                tx("B1", "bob", TransactionStatus::Borrowed, &d),
            ])
            .await
            .unwrap();

        let board = service.monthly(10).await;
        let alice = board
            .top_borrowers
            .iter()
            .find(|r| same_id(&r.school_id, "alice"))
            .unwrap();
        assert_eq!(alice.name, "Alice Liddell");
        assert_eq!(alice.photo, "alice.png");
        assert_eq!(alice.most_borrowed_book, "b1 Wonderland");

        // Case-insensitive grouping merges b1/B1; title resolved from the
        // inventory, unknown books fall back to the raw number.
        assert_eq!(board.top_books.len(), 1);
        assert_eq!(board.top_books[0].total_borrowed, 2);
        assert_eq!(board.top_books[0].title, "Wonderland");

        let bob = board
            .top_borrowers
            .iter()
            .find(|r| same_id(&r.school_id, "bob"))
            .unwrap();
        assert_eq!(bob.name, "bob");
        assert_eq!(bob.photo, "default.png");
    }

    #[tokio::test]
    async fn limit_truncates_both_rankings() {
        let (_dir, service, repo) = fixture().await;
        let d = this_month(0);
        let records: Vec<Transaction> = (0..4)
            .map(|i| {
                tx(
                    &format!("B{}", i),
                    &format!("member{}", i),
                    TransactionStatus::Borrowed,
                    &d,
                )
            })
            .collect();
        repo.transactions.save_all(&records).await.unwrap();

        let board = service.monthly(2).await;
        assert_eq!(board.top_borrowers.len(), 2);
        assert_eq!(board.top_books.len(), 2);
    }

    #[tokio::test]
    async fn profile_falls_back_to_a_zero_count_card() {
        let (_dir, service, repo) = fixture().await;
        repo.students
            .save_all(&[Member {
                name: "Quiet Reader".to_string(),
                school_id: "quiet".to_string(),
                password: "pw".to_string(),
                category: "Student".to_string(),
                photo: Member::default_photo(),
                status: MemberStatus::Approved,
                created_at: None,
            }])
            .await
            .unwrap();

        let card = service.profile("QUIET").await.unwrap();
        assert_eq!(card.total_borrowed, 0);
        assert_eq!(card.name, "Quiet Reader");
        assert_eq!(card.most_borrowed_book, "No records");

        let err = service.profile("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
