//! # Scan Errors
//!
//! Every failure here leaves the adapter fully stopped, so the caller can
//! report it and offer another start.

use thiserror::Error;

use crate::engine::EngineKind;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    /// The user (or platform) refused camera access.
    #[error("Camera permission denied")]
    PermissionDenied,

    /// No camera matches the requested facing.
    #[error("No camera available ({facing})")]
    NoCamera { facing: String },

    /// A camera exists but could not be opened (busy, unplugged, ...).
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// A decoder engine failed to start.
    #[error("{engine} decoder failed to start: {reason}")]
    DecoderInit { engine: EngineKind, reason: String },

    /// The requested mode has no engine to run it.
    #[error("No {0} decoder is installed")]
    EngineMissing(EngineKind),
}

impl ScanError {
    /// Whether another `start()` can succeed without reconfiguring the
    /// adapter (after granting permission, plugging a camera in, or once a
    /// decoder library finishes loading). Only a missing engine needs a
    /// different setup.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ScanError::EngineMissing(_))
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
