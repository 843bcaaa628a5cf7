//! # scanlog-core: Pure Domain Logic for scanlog
//!
//! Everything a scan session *means* lives here: the entry ledger, the batch
//! archive, money, header defaults and the export sheet layout. Nothing in
//! this crate touches a camera, a decoder, a database or a file.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        scanlog Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          scanlog-scan (decoder adapter)   CLI (manual entry)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ codes                                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 Session Controller (apps/scanlog)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ scanlog-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │ ledger  │ │ archive  │ │ export  │ │ money  │  │   │
//! │  │   │  Entry  │ │ Ledger  │ │ Archive  │ │ Sheet   │ │ Money  │  │   │
//! │  │   │  Batch  │ │ merge   │ │ close    │ │filename │ │        │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CAMERA • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               scanlog-store (SQLite key/value)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entry, Batch, BatchHeader, Discount, ScanMode, ...
//! - [`money`] - Integer-cent money type
//! - [`ledger`] - The live, not-yet-batched list of entries
//! - [`archive`] - Closed batches
//! - [`export`] - Spreadsheet row layout and filenames
//! - [`session`] - Ledger + archive + header draft as one value
//! - [`validation`] - Input parsing and coercion
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use scanlog_core::{BatchArchive, BatchHeader, Ledger, Money};
//!
//! let mut ledger = Ledger::default();
//! ledger.add_or_increment("0123456789012", 1, Money::zero());
//! ledger.add_or_increment("0123456789012", 1, Money::zero());
//! assert_eq!(ledger.entries()[0].quantity, 2);
//!
//! let mut archive = BatchArchive::default();
//! let id = archive.close(&mut ledger, BatchHeader::placeholder("2024-01-01")).unwrap();
//! assert_eq!(id.value(), 1);
//! assert!(ledger.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod archive;
pub mod error;
pub mod export;
pub mod ledger;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use archive::BatchArchive;
pub use error::{CoreError, CoreResult, ValidationError};
pub use export::{export_filename, sanitize_store_name, ExportLabel, ExportSheet};
pub use ledger::{Ledger, LedgerField, PriceMergePolicy};
pub use money::Money;
pub use session::Session;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Store name used when the header field is blank.
pub const DEFAULT_STORE_NAME: &str = "Store";

/// Maximum characters of the store name kept in an export filename.
pub const MAX_FILENAME_STORE_LEN: usize = 24;

/// Date format used for batch headers and export filenames.
pub const HEADER_DATE_FORMAT: &str = "%Y-%m-%d";
