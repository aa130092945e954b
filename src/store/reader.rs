//! Record Reader
//!
//! Scans the repository file front to back, decoding one line at a time.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{DriverStoreError, Result};
use crate::record::{codec, CorruptRecord, Driver};

/// Reads records from the repository file in file order
pub struct RecordReader {
    reader: BufReader<File>,

    /// 1-based number of the last line read
    line_no: usize,

    buf: Vec<u8>,

    /// Set after the first error so iteration stops there
    failed: bool,
}

impl RecordReader {
    /// Open the repository file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            line_no: 0,
            buf: Vec::new(),
            failed: false,
        })
    }

    /// Read and decode the next line
    ///
    /// Returns `Ok(None)` at end of file.
    pub fn next_record(&mut self) -> Result<Option<Driver>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let mut bytes = self.buf.as_slice();
        if let Some(stripped) = bytes.strip_suffix(b"\n") {
            bytes = stripped;
        }
        if let Some(stripped) = bytes.strip_suffix(b"\r") {
            bytes = stripped;
        }

        let line = std::str::from_utf8(bytes).map_err(|_| self.corrupt(CorruptRecord::InvalidUtf8))?;
        let driver = codec::decode(line).map_err(|reason| self.corrupt(reason))?;
        Ok(Some(driver))
    }

    /// Number of lines read so far
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    fn corrupt(&self, reason: CorruptRecord) -> DriverStoreError {
        DriverStoreError::CorruptRecord {
            line: self.line_no,
            reason,
        }
    }
}

impl Iterator for RecordReader {
    type Item = Result<Driver>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(Some(driver)) => Some(Ok(driver)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
