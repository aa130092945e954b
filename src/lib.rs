//! # driverstore
//!
//! An append-only record store for driver entities with:
//! - One flat, `;`-delimited text line per record
//! - Ids allocated from the file's last line (highest plus one)
//! - Strict decoding: a corrupt line fails the whole read
//! - Async read/filter/create operations on tokio's blocking pool
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Outer layers (CLI, HTTP routing)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  find_all / find_created_after / save
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 FileDriverRepository                        │
//! │                 (spawn_blocking per call)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      RecordFile                             │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐               ┌───────────────────┐
//!   │  RecordReader   │               │   RecordWriter    │
//!   │  (full scans)   │               │ (tail + append,   │
//!   └────────┬────────┘               │  Mutex)           │
//!            │                        └─────────┬─────────┘
//!            └──────────────┬───────────────────┘
//!                           ▼
//!                   ┌───────────────┐
//!                   │  record codec │
//!                   └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod store;
pub mod repository;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, SyncStrategy};
pub use error::{DriverStoreError, ErrorKind, ErrorMsg, Result};
pub use record::Driver;
pub use repository::{DriverRepository, FileDriverRepository};
pub use store::{RecordFile, VerifyReport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of driverstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
