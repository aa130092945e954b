//! Record Writer
//!
//! Allocates the next id and appends one encoded line to the repository file.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::error;

use crate::config::SyncStrategy;
use crate::error::{DriverStoreError, Result};
use crate::record::{codec, Driver};

use super::tail;

/// Appends records to the repository file
///
/// ## Concurrency
/// `append` holds `write_lock` across "read tail + append", so writers that
/// share this `RecordWriter` never allocate the same id. Writers in other
/// processes are not coordinated.
pub struct RecordWriter {
    path: PathBuf,

    sync_strategy: SyncStrategy,

    /// Serializes id allocation and append
    write_lock: Mutex<()>,
}

impl RecordWriter {
    pub fn new(path: &Path, sync_strategy: SyncStrategy) -> Self {
        Self {
            path: path.to_path_buf(),
            sync_strategy,
            write_lock: Mutex::new(()),
        }
    }

    /// Append a driver under the next id and return that id
    ///
    /// The line and its terminator go out in one `write_all` on a handle
    /// opened in append mode, so bytes already in the file are never
    /// touched. If the write or the sync fails, the file is cut back to
    /// its previous length before the error is returned.
    pub fn append(&self, driver: &Driver) -> Result<u64> {
        let _write_guard = self.write_lock.lock();

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)?;

        append_record(&mut file, driver, self.sync_strategy)
    }

    pub fn sync_strategy(&self) -> SyncStrategy {
        self.sync_strategy
    }
}

/// File operations an append needs beyond read/seek/write
pub(crate) trait AppendTarget: Read + Seek + Write {
    fn set_len(&mut self, len: u64) -> io::Result<()>;

    fn sync_data(&mut self) -> io::Result<()>;
}

impl AppendTarget for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn sync_data(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }
}

/// Allocate the next id from the tail and append one line
///
/// Either the whole line is in the file and its id is returned, or the
/// file is left at its original length and an error is returned.
pub(crate) fn append_record<T: AppendTarget>(
    target: &mut T,
    driver: &Driver,
    sync_strategy: SyncStrategy,
) -> Result<u64> {
    let len = target.seek(SeekFrom::End(0))?;

    let tail_line = tail::read_tail_line(target)?;
    let id = tail::next_id(tail_line.as_ref().map(|tail| tail.text.as_str()))
        .map_err(DriverStoreError::CorruptTail)?;

    let mut line = codec::encode_line(id, driver);
    // close off a tail line that was left without its terminator
    if matches!(&tail_line, Some(tail) if !tail.terminated) {
        line.insert(0, '\n');
    }

    let written = target.write_all(line.as_bytes()).and_then(|()| {
        if sync_strategy == SyncStrategy::EveryWrite {
            target.sync_data()
        } else {
            Ok(())
        }
    });

    if let Err(e) = written {
        if let Err(rollback) = target.set_len(len) {
            error!(id, len, error = %rollback, "failed to roll back partial append");
        }
        return Err(e.into());
    }

    Ok(id)
}
