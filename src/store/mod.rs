//! Store Module
//!
//! Synchronous access to the repository file.
//!
//! ## Responsibilities
//! - Create the repository file on startup if it is missing
//! - Full and filtered scans, re-reading the file on every call
//! - Id allocation from the tail line plus a single append per record
//! - Verification of the monotonic id invariant
//!
//! ## File Format
//! ```text
//! 1;Jaime;Bergas;1984-05-15;2020-02-08\n
//! 2;Jane;Doe;1980-05-15;2018-02-08\n
//! ...                                   <- appends only, last line holds the highest id
//! ```
//!
//! There is no index: every read is a full scan, so read cost grows
//! linearly with the number of records.

mod reader;
mod tail;
mod writer;

pub use reader::RecordReader;
pub use tail::{next_id, read_tail_line, TailLine, TAIL_CHUNK_SIZE};
pub use writer::RecordWriter;

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Config, SyncStrategy};
use crate::error::{DriverStoreError, Result};
use crate::record::{codec, Driver};

/// Outcome of a full verification scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    /// Number of records decoded
    pub records: usize,

    /// Id on the last line, if any
    pub last_id: Option<u64>,

    /// Lines whose id is not greater than the id before them
    pub out_of_order: usize,
}

impl VerifyReport {
    pub fn is_monotonic(&self) -> bool {
        self.out_of_order == 0
    }
}

/// The repository file
///
/// ## Concurrency
/// - Reads open their own handle and need no lock
/// - Appends are serialized by the `RecordWriter`
pub struct RecordFile {
    path: PathBuf,
    writer: RecordWriter,
}

impl RecordFile {
    /// Open the repository file described by `config`, creating it if absent
    ///
    /// Missing parent directories are created too. Any failure here is
    /// fatal: the caller must not proceed without a store.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.repository_path();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        Self::create_if_missing(&path)?;

        info!(path = %path.display(), "repository file ready");

        Ok(Self {
            writer: RecordWriter::new(&path, config.sync_strategy),
            path,
        })
    }

    /// Create an empty file unless one already exists
    ///
    /// An existing file is not opened for writing, so a read-only data file
    /// still serves reads; only appends to it fail.
    fn create_if_missing(path: &Path) -> Result<()> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {
                info!(path = %path.display(), "created empty repository file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if fs::metadata(path)?.is_dir() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("repository path is a directory: {}", path.display()),
                    )
                    .into());
                }
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open a repository file at an explicit path
    ///
    /// Uses default config for everything else
    pub fn open_path(path: &Path) -> Result<Self> {
        let data_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let filename = path
            .file_name()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("repository path has no file name: {}", path.display()),
                )
            })?
            .to_string_lossy()
            .into_owned();

        let config = Config::builder()
            .data_dir(data_dir)
            .repository_filename(filename)
            .build();
        Self::open(&config)
    }

    /// All records in file order
    pub fn scan_all(&self) -> Result<Vec<Driver>> {
        self.scan_filtered(|_| true)
    }

    /// Records created strictly after `date`, in file order
    pub fn scan_created_after(&self, date: NaiveDate) -> Result<Vec<Driver>> {
        self.scan_filtered(|driver| driver.creation_date > date)
    }

    /// Records matching `keep`, in file order
    ///
    /// The first undecodable line aborts the scan; nothing is returned.
    pub fn scan_filtered<F>(&self, mut keep: F) -> Result<Vec<Driver>>
    where
        F: FnMut(&Driver) -> bool,
    {
        let mut reader = RecordReader::open(&self.path)?;
        let mut drivers = Vec::new();

        loop {
            match reader.next_record() {
                Ok(Some(driver)) => {
                    if keep(&driver) {
                        drivers.push(driver);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "scan aborted");
                    return Err(e);
                }
            }
        }

        debug!(
            lines = reader.lines_read(),
            matched = drivers.len(),
            "scan complete"
        );
        Ok(drivers)
    }

    /// Store a transient driver under the next id
    ///
    /// Any id already on `driver` is ignored. On success the returned driver
    /// carries the assigned id and the file has grown by exactly one line.
    /// On failure nothing is returned and the record is not persisted.
    pub fn append(&self, mut driver: Driver) -> Result<Driver> {
        driver.validate()?;

        let id = self.writer.append(&driver)?;
        driver.id = Some(id);

        debug!(id, "record appended");
        Ok(driver)
    }

    /// Id held by the tail line, `None` for an empty file
    pub fn last_id(&self) -> Result<Option<u64>> {
        let mut file = File::open(&self.path)?;
        match read_tail_line(&mut file)? {
            None => Ok(None),
            Some(tail) => {
                let id = codec::parse_leading_id(&tail.text)
                    .map_err(DriverStoreError::CorruptTail)?;
                Ok(Some(id))
            }
        }
    }

    /// Scan every line and check that ids strictly increase
    pub fn verify(&self) -> Result<VerifyReport> {
        let mut report = VerifyReport::default();

        for driver in RecordReader::open(&self.path)? {
            let id = driver?.id;
            if let (Some(previous), Some(current)) = (report.last_id, id) {
                if current <= previous {
                    warn!(previous, current, "id out of order");
                    report.out_of_order += 1;
                }
            }
            report.records += 1;
            report.last_id = id;
        }

        debug!(records = report.records, out_of_order = report.out_of_order, "verify complete");
        Ok(report)
    }

    /// Path of the repository file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sync_strategy(&self) -> SyncStrategy {
        self.writer.sync_strategy()
    }
}
