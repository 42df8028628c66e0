//! Catalog service: book inventory maintenance and the category taxonomy.

use crate::{
    error::{AppError, AppResult},
    models::{same_id, Book, BookStatus},
    repository::{Repository, DEFAULT_CATEGORIES},
    services::reconcile::ReconcileService,
};

/// Longest accepted category name
const MAX_CATEGORY_LEN: usize = 80;

/// Trim and cap a raw category name; empty means invalid.
pub fn sanitize_category(raw: &str) -> String {
    raw.trim().chars().take(MAX_CATEGORY_LEN).collect()
}

/// Outcome of a bulk import run
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct BulkImportSummary {
    pub added: usize,
    pub total_in_db: usize,
    pub categories: Vec<String>,
}

/// Partial book update; only supplied fields change
#[derive(Debug, Clone, Default, serde::Deserialize, utoipa::ToSchema)]
pub struct BookPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub status: Option<BookStatus>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    reconcile: ReconcileService,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        let reconcile = ReconcileService::new(repository.clone());
        Self {
            repository,
            reconcile,
        }
    }

    /// Current inventory, reconciled first.
    pub async fn list_books(&self) -> Vec<Book> {
        self.reconcile.run().await
    }

    /// Bulk-register books from pasted text, one `number <sep> title` pair
    /// per line. Accepts `|`, the first `,`, or whitespace as separator;
    /// book numbers are upper-cased and duplicates skipped.
    pub async fn bulk_import(
        &self,
        text: &str,
        category: &str,
        clear_first: bool,
    ) -> AppResult<BulkImportSummary> {
        let category = {
            let clean = sanitize_category(category);
            if clean.is_empty() {
                "General".to_string()
            } else {
                clean
            }
        };

        let _guard = self.repository.write_guard().await;
        let mut books = if clear_first {
            Vec::new()
        } else {
            self.repository.books.load_all().await
        };

        let mut added = 0;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (number, title) = if line.contains('|') {
                // Extra pipe-separated columns are ignored.
                let parts: Vec<&str> = line.split('|').collect();
                (parts[0], *parts.get(1).unwrap_or(&""))
            } else if line.contains(',') {
                let mut parts = line.splitn(2, ',');
                (parts.next().unwrap_or(""), parts.next().unwrap_or(""))
            } else {
                match line.split_once(char::is_whitespace) {
                    Some((n, t)) => (n, t),
                    None => continue,
                }
            };

            let book_no = number.trim().to_uppercase().replace(',', "");
            let title = title.trim();
            if book_no.is_empty() || title.is_empty() {
                continue;
            }
            if books.iter().any(|b| same_id(&b.book_no, &book_no)) {
                continue;
            }
            books.push(Book {
                book_no,
                title: title.to_string(),
                category: category.clone(),
                status: BookStatus::Available,
            });
            added += 1;
        }

        self.repository.books.save_all(&books).await?;
        let categories = self.sync_categories(&books).await?;
        tracing::info!(added, total = books.len(), "bulk import complete");
        Ok(BulkImportSummary {
            added,
            total_in_db: books.len(),
            categories,
        })
    }

    /// Apply a partial update to one book.
    pub async fn update_book(&self, book_no: &str, patch: BookPatch) -> AppResult<()> {
        let _guard = self.repository.write_guard().await;
        let mut books = self.repository.books.load_all().await;
        let book = books
            .iter_mut()
            .find(|b| same_id(&b.book_no, book_no))
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        if let Some(title) = patch.title {
            book.title = title;
        }
        if let Some(category) = patch.category {
            let clean = sanitize_category(&category);
            book.category = if clean.is_empty() {
                "General".to_string()
            } else {
                clean
            };
        }
        if let Some(status) = patch.status {
            book.status = status;
        }

        self.repository.books.save_all(&books).await?;
        let books = self.repository.books.load_all().await;
        self.sync_categories(&books).await?;
        Ok(())
    }

    /// Remove a book from the inventory. Removing an unknown book is fine.
    pub async fn delete_book(&self, book_no: &str) -> AppResult<()> {
        let _guard = self.repository.write_guard().await;
        let mut books = self.repository.books.load_all().await;
        books.retain(|b| !same_id(&b.book_no, book_no));
        self.repository.books.save_all(&books).await?;
        self.sync_categories(&books).await?;
        Ok(())
    }

    /// The category taxonomy, synced with whatever categories the books
    /// currently use.
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        let _guard = self.repository.write_guard().await;
        let books = self.repository.books.load_all().await;
        self.sync_categories(&books).await
    }

    /// Add a category by hand. Returns the list plus whether it was new.
    pub async fn add_category(&self, name: &str) -> AppResult<(Vec<String>, bool)> {
        let name = sanitize_category(name);
        if name.is_empty() {
            return Err(AppError::Validation("Invalid category name".to_string()));
        }

        let _guard = self.repository.write_guard().await;
        let mut categories = self.clean_categories().await;
        if categories.contains(&name) {
            return Ok((categories, false));
        }
        categories.push(name);
        self.repository.categories.save_all(&categories).await?;
        Ok((categories, true))
    }

    /// Remove an unused category. Categories still referenced by books are
    /// protected.
    pub async fn delete_category(&self, name: &str) -> AppResult<Vec<String>> {
        let name = sanitize_category(name);
        if name.is_empty() {
            return Err(AppError::Validation("Invalid category name".to_string()));
        }

        let _guard = self.repository.write_guard().await;
        let books = self.repository.books.load_all().await;
        if books.iter().any(|b| sanitize_category(&b.category) == name) {
            return Err(AppError::Conflict(
                "Category is in use by existing books".to_string(),
            ));
        }
        let mut categories = self.clean_categories().await;
        categories.retain(|c| c != &name);
        self.repository.categories.save_all(&categories).await?;
        Ok(categories)
    }

    /// Remove a category together with its books and their transactions.
    /// Saves are snapshot-guarded: a failure restores the previous state.
    pub async fn delete_category_cascade(&self, name: &str) -> AppResult<()> {
        let name = sanitize_category(name);
        if name.is_empty() || name == "All Collections" {
            return Err(AppError::Validation("Invalid category name".to_string()));
        }

        let _guard = self.repository.write_guard().await;
        let books_snapshot = self.repository.books.load_all().await;
        let transactions_snapshot = self.repository.transactions.load_all().await;
        let categories_snapshot = self.clean_categories().await;

        let doomed: Vec<String> = books_snapshot
            .iter()
            .filter(|b| sanitize_category(&b.category) == name)
            .map(|b| b.book_no.clone())
            .collect();

        let filtered_transactions: Vec<_> = transactions_snapshot
            .iter()
            .filter(|t| !doomed.iter().any(|no| same_id(no, &t.book_no)))
            .cloned()
            .collect();
        let filtered_books: Vec<_> = books_snapshot
            .iter()
            .filter(|b| sanitize_category(&b.category) != name)
            .cloned()
            .collect();
        let filtered_categories: Vec<_> = categories_snapshot
            .iter()
            .filter(|c| **c != name)
            .cloned()
            .collect();

        let result: AppResult<()> = async {
            self.repository
                .transactions
                .save_all(&filtered_transactions)
                .await?;
            self.repository.books.save_all(&filtered_books).await?;
            self.repository
                .categories
                .save_all(&filtered_categories)
                .await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            tracing::error!("cascade delete failed, restoring snapshots: {}", e);
            let _ = self
                .repository
                .transactions
                .save_all(&transactions_snapshot)
                .await;
            let _ = self.repository.books.save_all(&books_snapshot).await;
            let _ = self
                .repository
                .categories
                .save_all(&categories_snapshot)
                .await;
            return Err(e);
        }
        Ok(())
    }

    /// Load the stored list, dropping blanks and duplicates and making sure
    /// the defaults are present.
    async fn clean_categories(&self) -> Vec<String> {
        let stored = self.repository.categories.load_all().await;
        let mut clean: Vec<String> = Vec::new();
        for raw in stored {
            let name = sanitize_category(&raw);
            if !name.is_empty() && !clean.contains(&name) {
                clean.push(name);
            }
        }
        for default in DEFAULT_CATEGORIES {
            if !clean.iter().any(|c| c == default) {
                clean.push(default.to_string());
            }
        }
        clean
    }

    /// Make sure every category referenced by a book exists in the list.
    async fn sync_categories(&self, books: &[Book]) -> AppResult<Vec<String>> {
        let mut categories = self.clean_categories().await;
        for book in books {
            let category = sanitize_category(&book.category);
            if !category.is_empty() && !categories.contains(&category) {
                categories.push(category);
            }
        }
        self.repository.categories.save_all(&categories).await?;
        Ok(categories)
    }
}
