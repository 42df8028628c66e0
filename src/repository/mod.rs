//! Repository layer: typed handles over the flat JSON record collections

pub mod store;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::{
    datetime,
    error::AppResult,
    models::{Book, Member, MemberStatus, Rating, SystemConfig, Ticket, Transaction},
};
use store::{JsonCollection, JsonDocument};

/// Default category taxonomy, always present
pub const DEFAULT_CATEGORIES: [&str; 4] = ["General", "Mathematics", "Science", "Literature"];

/// Container for all record collections.
///
/// The store performs whole-collection read/overwrite with no cross-request
/// coordination of its own. Mutating operations serialize their
/// load-mutate-save sections through [`Repository::write_guard`]; plain
/// reads go lock-free and may observe the previous snapshot.
#[derive(Clone)]
pub struct Repository {
    pub books: JsonCollection<Book>,
    pub transactions: JsonCollection<Transaction>,
    pub tickets: JsonCollection<Ticket>,
    pub students: JsonCollection<Member>,
    pub staff: JsonCollection<Member>,
    pub ratings: JsonCollection<Rating>,
    pub categories: JsonCollection<String>,
    pub system: JsonDocument<SystemConfig>,
    write_lock: Arc<Mutex<()>>,
}

impl Repository {
    /// Create a repository over the given data directory without touching
    /// the filesystem.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            books: JsonCollection::new(dir.join("books.json")),
            transactions: JsonCollection::new(dir.join("transactions.json")),
            tickets: JsonCollection::new(dir.join("tickets.json")),
            students: JsonCollection::new(dir.join("users.json")),
            staff: JsonCollection::new(dir.join("admins.json")),
            ratings: JsonCollection::new(dir.join("ratings.json")),
            categories: JsonCollection::new(dir.join("categories.json")),
            system: JsonDocument::new(dir.join("system_config.json")),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open the data directory, creating missing collection files and
    /// seeding the defaults a fresh installation needs.
    pub async fn open(data_dir: impl AsRef<Path>) -> AppResult<Self> {
        tokio::fs::create_dir_all(data_dir.as_ref()).await?;
        let repo = Self::new(data_dir);

        repo.books.ensure_exists().await?;
        repo.transactions.ensure_exists().await?;
        repo.tickets.ensure_exists().await?;
        repo.students.ensure_exists().await?;
        repo.staff.ensure_exists().await?;
        repo.ratings.ensure_exists().await?;
        repo.system.ensure_exists().await?;

        // Category list starts from the built-in defaults.
        let mut categories = repo.categories.load_all().await;
        let mut changed = false;
        for default in DEFAULT_CATEGORIES {
            if !categories.iter().any(|c| c == default) {
                categories.push(default.to_string());
                changed = true;
            }
        }
        if changed {
            repo.categories.save_all(&categories).await?;
        }

        // Normalize legacy student records missing a status field.
        let students = repo.students.load_all().await;
        repo.students.save_all(&students).await?;

        // A fresh install gets a root staff account.
        let mut staff = repo.staff.load_all().await;
        if staff.is_empty() {
            staff.push(Member {
                name: "System Administrator".to_string(),
                school_id: "admin".to_string(),
                password: "admin".to_string(),
                category: "Staff".to_string(),
                photo: Member::default_photo(),
                status: MemberStatus::Approved,
                created_at: Some("SYSTEM_INIT".to_string()),
            });
            repo.staff.save_all(&staff).await?;
            tracing::info!("seeded root staff account");
        }

        let mut system = repo.system.load().await;
        system.last_reboot = Some(datetime::now().format(datetime::MINUTE_FORMAT).to_string());
        repo.system.save(&system).await?;

        Ok(repo)
    }

    /// Acquire the store-wide write lock. Every mutating load-mutate-save
    /// section holds this guard for its whole duration.
    pub async fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}
