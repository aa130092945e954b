//! Repository Module
//!
//! Async front of the store: the operations outer layers call.
//!
//! ## Responsibilities
//! - Run each file operation on tokio's blocking pool
//! - Hand results back through a future the caller awaits
//! - Surface task failures as typed errors
//!
//! Dropping a returned future does not stop the blocking work behind it:
//! an append always runs to completion, so no half-written line is left.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::config::Config;
use crate::error::{DriverStoreError, Result};
use crate::record::Driver;
use crate::store::{RecordFile, VerifyReport};

/// Operations exposed to outer layers (routing, CLI)
#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// All drivers, in creation order
    async fn find_all(&self) -> Result<Vec<Driver>>;

    /// Drivers whose creation date is strictly after `date`
    async fn find_created_after(&self, date: NaiveDate) -> Result<Vec<Driver>>;

    /// Store a transient driver and return it with its assigned id
    async fn save(&self, driver: Driver) -> Result<Driver>;
}

/// File-backed repository
///
/// Cheap to clone; clones share one `RecordFile`, and therefore one writer
/// lock, so saves through any clone never allocate the same id.
#[derive(Clone)]
pub struct FileDriverRepository {
    store: Arc<RecordFile>,
}

impl FileDriverRepository {
    /// Open the repository, creating its file if needed
    ///
    /// Runs synchronously: a repository that cannot create its file must
    /// not be handed out.
    pub fn open(config: &Config) -> Result<Self> {
        let store = RecordFile::open(config)?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Open with a path (convenience method)
    pub fn open_path(path: &Path) -> Result<Self> {
        let store = RecordFile::open_path(path)?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Check the monotonic id invariant over the whole file
    pub async fn verify(&self) -> Result<VerifyReport> {
        self.run_blocking("verify", |store| store.verify()).await
    }

    /// Path of the repository file
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    async fn run_blocking<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&RecordFile) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        debug!(operation, "dispatching");

        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| DriverStoreError::Task(format!("{} task failed: {}", operation, e)))?
    }
}

#[async_trait]
impl DriverRepository for FileDriverRepository {
    async fn find_all(&self) -> Result<Vec<Driver>> {
        self.run_blocking("find_all", |store| store.scan_all()).await
    }

    async fn find_created_after(&self, date: NaiveDate) -> Result<Vec<Driver>> {
        self.run_blocking("find_created_after", move |store| {
            store.scan_created_after(date)
        })
        .await
    }

    async fn save(&self, driver: Driver) -> Result<Driver> {
        self.run_blocking("save", move |store| store.append(driver)).await
    }
}
