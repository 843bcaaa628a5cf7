//! # Manual Feed
//!
//! A [`DecoderEngine`] whose "decodes" are pushed in by code: a
//! keyboard-wedge scanner typing into stdin, a script, a test.
//!
//! ```rust,ignore
//! let feed = ManualFeed::new(EngineKind::Linear);
//! let handle = feed.handle();
//! let adapter = DecoderAdapter::new(camera, config).with_engine(Arc::new(feed));
//! handle.push("4006381333931");
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::camera::VideoStream;
use crate::engine::{DecoderEngine, DetectionSink, EngineKind};
use crate::error::{ScanError, ScanResult};

#[derive(Debug, Default)]
struct FeedState {
    sink: Option<DetectionSink>,
    starts: usize,
    stops: usize,
    fail_next: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ManualFeed {
    kind: EngineKind,
    state: Arc<Mutex<FeedState>>,
}

/// Push side of a [`ManualFeed`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    state: Arc<Mutex<FeedState>>,
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ManualFeed {
    pub fn new(kind: EngineKind) -> Self {
        ManualFeed {
            kind,
            state: Arc::default(),
        }
    }

    pub fn handle(&self) -> FeedHandle {
        FeedHandle {
            state: self.state.clone(),
        }
    }
}

impl DecoderEngine for ManualFeed {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    fn start(&self, stream: Arc<dyn VideoStream>, sink: DetectionSink) -> ScanResult<()> {
        let mut state = lock(&self.state);
        if let Some(reason) = state.fail_next.take() {
            return Err(ScanError::DecoderInit {
                engine: self.kind,
                reason,
            });
        }
        debug!(engine = %self.kind, stream = %stream.label(), "Manual feed started");
        state.sink = Some(sink);
        state.starts += 1;
        Ok(())
    }

    fn stop(&self) {
        let mut state = lock(&self.state);
        state.sink = None;
        state.stops += 1;
    }
}

impl FeedHandle {
    /// Delivers a code as if the engine had decoded it.
    ///
    /// Returns `false` when the engine is not running.
    pub fn push(&self, code: impl Into<String>) -> bool {
        match &lock(&self.state).sink {
            Some(sink) => sink.emit(code),
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).sink.is_some()
    }

    /// Times the engine has been started.
    pub fn starts(&self) -> usize {
        lock(&self.state).starts
    }

    /// Times the engine has been stopped.
    pub fn stops(&self) -> usize {
        lock(&self.state).stops
    }

    /// Makes the next `start` fail with `ScanError::DecoderInit`.
    pub fn fail_next_start(&self, reason: impl Into<String>) {
        lock(&self.state).fail_next = Some(reason.into());
    }
}
