//! Record Module
//!
//! The `Driver` entity and its one-line text encoding.
//!
//! ## Line Format
//! ```text
//! ┌──────┬───────────┬──────────┬─────────────┬──────────────┐
//! │  id  │ firstName │ lastName │ dateOfBirth │ creationDate │
//! └──────┴───────────┴──────────┴─────────────┴──────────────┘
//!   separated by ';', dates as YYYY-MM-DD, terminated by '\n'
//! ```

pub mod codec;

pub use codec::{CorruptRecord, DATE_FORMAT, DELIMITER, FIELD_COUNT};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DriverStoreError, Result};

/// A driver entity
///
/// A driver with `id == None` is transient: it has not been stored yet.
/// The store assigns the id on save; any id set by the caller is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    /// Store-assigned id, strictly increasing with file position
    #[serde(default)]
    pub id: Option<u64>,

    pub first_name: String,

    pub last_name: String,

    pub date_of_birth: NaiveDate,

    /// Date the record was built, defaults to today
    #[serde(default = "today")]
    pub creation_date: NaiveDate,
}

impl Driver {
    /// Build a transient driver created today
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            creation_date: today(),
        }
    }

    /// Override the creation date
    pub fn with_creation_date(mut self, creation_date: NaiveDate) -> Self {
        self.creation_date = creation_date;
        self
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }

    /// Check that the driver can be encoded and decoded back unchanged
    ///
    /// Names must be non-blank and must not contain the field delimiter
    /// or a line terminator.
    pub fn validate(&self) -> Result<()> {
        validate_name("first name", &self.first_name)?;
        validate_name("last name", &self.last_name)?;
        Ok(())
    }
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DriverStoreError::BadInput(format!("{} is required", field)));
    }
    if value.contains([DELIMITER, '\n', '\r']) {
        return Err(DriverStoreError::BadInput(format!(
            "{} must not contain '{}' or line breaks",
            field, DELIMITER
        )));
    }
    Ok(())
}

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
