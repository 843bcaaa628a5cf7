//! # Camera
//!
//! A [`CameraProvider`] hands out at most one live [`VideoStream`] per
//! `start()`. The adapter owns the stream and releases it exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use scanlog_core::CameraFacing;

use crate::error::ScanResult;

/// A live camera stream shared by the running engines.
pub trait VideoStream: Send + Sync {
    /// Human-readable device label, for logs.
    fn label(&self) -> &str;

    fn facing(&self) -> CameraFacing;

    /// Turns the camera off. Called once by the adapter.
    fn release(&self);
}

/// Source of video streams.
pub trait CameraProvider: Send + Sync {
    /// Opens a stream for the requested facing.
    ///
    /// ## Errors
    /// - `ScanError::PermissionDenied` when access is refused
    /// - `ScanError::NoCamera` when no device matches
    fn open(&self, facing: CameraFacing) -> ScanResult<Arc<dyn VideoStream>>;
}

// =============================================================================
// FixedCamera
// =============================================================================

/// Provider that always grants a stream. Used with [`crate::ManualFeed`]
/// where codes arrive from a keyboard-wedge scanner or stdin.
#[derive(Debug, Clone, Default)]
pub struct FixedCamera {
    counters: Arc<StreamCounters>,
}

#[derive(Debug, Default)]
struct StreamCounters {
    opened: AtomicUsize,
    released: AtomicUsize,
}

impl FixedCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams opened so far.
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Streams released so far.
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }
}

impl CameraProvider for FixedCamera {
    fn open(&self, facing: CameraFacing) -> ScanResult<Arc<dyn VideoStream>> {
        let n = self.counters.opened.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Arc::new(FixedStream {
            label: format!("fixed-{}-{}", facing, n),
            facing,
            counters: self.counters.clone(),
        }))
    }
}

struct FixedStream {
    label: String,
    facing: CameraFacing,
    counters: Arc<StreamCounters>,
}

impl VideoStream for FixedStream {
    fn label(&self) -> &str {
        &self.label
    }

    fn facing(&self) -> CameraFacing {
        self.facing
    }

    fn release(&self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_camera_counts() {
        let camera = FixedCamera::new();
        let stream = camera.open(CameraFacing::Front).unwrap();
        assert_eq!(stream.facing(), CameraFacing::Front);
        assert_eq!(stream.label(), "fixed-front-1");
        assert_eq!((camera.opened(), camera.released()), (1, 0));

        stream.release();
        assert_eq!(camera.released(), 1);
    }
}
