//! # Application Error Type
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CoreError ───┐                                                         │
//! │  DbError ─────┤                                                         │
//! │  ScanError ───┼──► AppError ──► code() + user message ──► CLI / logs   │
//! │  ExportError ─┤                                                         │
//! │  ConfigError ─┘                                                         │
//! │                                                                         │
//! │  Nothing here is fatal: every failure leaves the session usable.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use scanlog_core::{CoreError, ValidationError};
use scanlog_scan::ScanError;
use scanlog_store::DbError;

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Camera refused or missing; user can fix it and retry
    CameraError,

    /// Decoder library failed to start
    DecoderError,

    /// Input validation failed
    ValidationError,

    /// Operation on an empty ledger
    EmptyLedger,

    /// Unknown entry index or batch id
    NotFound,

    /// Database operation failed
    DatabaseError,

    /// Spreadsheet could not be written
    ExportError,

    /// Configuration could not be read, parsed or saved
    ConfigError,

    /// Console or file I/O failed
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Core(CoreError::Validation(err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Core(CoreError::Validation(_)) => ErrorCode::ValidationError,
            AppError::Core(CoreError::EmptyLedger | CoreError::NothingToExport) => {
                ErrorCode::EmptyLedger
            }
            AppError::Core(CoreError::EntryNotFound(_) | CoreError::BatchNotFound(_)) => {
                ErrorCode::NotFound
            }
            AppError::Db(_) => ErrorCode::DatabaseError,
            AppError::Scan(ScanError::DecoderInit { .. } | ScanError::EngineMissing(_)) => {
                ErrorCode::DecoderError
            }
            AppError::Scan(_) => ErrorCode::CameraError,
            AppError::Export(_) => ErrorCode::ExportError,
            AppError::Config(_) => ErrorCode::ConfigError,
            AppError::Io(_) => ErrorCode::Internal,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Database details are logged, not shown.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Db(e) => {
                tracing::error!("Database error: {}", e);
                "Could not save or load the session".to_string()
            }
            AppError::Scan(ScanError::PermissionDenied) => {
                "Camera permission denied. Allow camera access and start again.".to_string()
            }
            AppError::Scan(ScanError::NoCamera { .. }) => {
                "No camera found. Connect a camera or switch camera and start again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Serializable form for `--json` output.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code(),
            message: self.user_message(),
        }
    }
}

/// What a front end receives when an operation fails.
///
/// ```json
/// { "code": "EMPTY_LEDGER", "message": "No entries to move to batch" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use scanlog_core::BatchId;

    #[test]
    fn test_codes() {
        assert_eq!(
            AppError::from(CoreError::EmptyLedger).code(),
            ErrorCode::EmptyLedger
        );
        assert_eq!(
            AppError::from(CoreError::BatchNotFound(BatchId::new(3))).code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            AppError::from(ScanError::PermissionDenied).code(),
            ErrorCode::CameraError
        );
        assert_eq!(
            AppError::from(ValidationError::Required {
                field: "code".into()
            })
            .code(),
            ErrorCode::ValidationError
        );
    }

    #[test]
    fn test_payload_serializes() {
        let json = serde_json::to_string(&AppError::from(CoreError::EmptyLedger).payload()).unwrap();
        assert_eq!(
            json,
            r#"{"code":"EMPTY_LEDGER","message":"No entries to move to batch"}"#
        );
    }
}
