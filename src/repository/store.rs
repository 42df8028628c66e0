//! Whole-collection JSON persistence.
//!
//! The store knows exactly two operations per collection: load everything,
//! save everything. Callers load the full collection, mutate in memory and
//! write the full collection back. A read failure degrades to the default
//! value with an error log so one corrupt file cannot take the service
//! down; write failures are reported to the caller.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppResult;

/// A flat ordered sequence of records persisted as one pretty-printed JSON
/// array.
pub struct JsonCollection<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonCollection<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole collection. A missing file is an empty collection;
    /// unreadable or unparsable content is logged and degraded to empty.
    pub async fn load_all(&self) -> Vec<T> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!("read error ({}): {}", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("parse error ({}): {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Overwrite the whole collection.
    pub async fn save_all(&self, records: &[T]) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    /// Create the backing file with an empty collection if it is missing.
    pub async fn ensure_exists(&self) -> AppResult<()> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        self.save_all(&[]).await
    }
}

/// A single JSON object document (the system configuration).
pub struct JsonDocument<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonDocument<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Load the document, degrading to `T::default()` on any read failure.
    pub async fn load(&self) -> T {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::error!("read error ({}): {}", self.path.display(), e);
                }
                return T::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!("parse error ({}): {}", self.path.display(), e);
                T::default()
            }
        }
    }

    pub async fn save(&self, doc: &T) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    pub async fn ensure_exists(&self) -> AppResult<()> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        self.save(&T::default()).await
    }
}
