//! # Error Types
//!
//! Domain-specific error types for scanlog-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  scanlog-core errors (this file)                                       │
//! │  ├── CoreError        - Empty operations, unknown index / batch        │
//! │  └── ValidationError  - Manual-entry input failures                    │
//! │                                                                         │
//! │  scanlog-store  └── DbError    - Persistence failures                  │
//! │  scanlog-scan   └── ScanError  - Camera / decoder failures             │
//! │  apps/scanlog   └── AppError   - What the user sees                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are fatal. Every variant leaves the session usable.

use thiserror::Error;

use crate::types::BatchId;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Closing a batch with nothing in the ledger.
    ///
    /// ## When This Occurs
    /// - "Next batch" pressed before anything was scanned
    /// - Ledger was just restored from an empty batch (cannot happen today,
    ///   batches are never empty)
    #[error("No entries to move to batch")]
    EmptyLedger,

    /// Exporting the live ledger while it is empty.
    #[error("No entries to export")]
    NothingToExport,

    /// Ledger index out of range (stale UI row).
    #[error("Entry not found at position {0}")]
    EntryNotFound(usize),

    /// No batch with this id in the archive.
    #[error("Batch not found: {0}")]
    BatchNotFound(BatchId),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the manual-entry boundary before any ledger mutation, so a
/// rejected input never leaves a partial entry behind.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (not a number, not a date, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
