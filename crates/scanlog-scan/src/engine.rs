//! # Decoder Engines
//!
//! ```text
//!   VideoStream ──► DecoderEngine::start(stream, sink)
//!                         │
//!                         │ sink.emit("4006381333931")
//!                         ▼
//!                   mpsc channel ──► ScanSubscription (debounced)
//! ```
//!
//! Engines run on their own (worker threads, tasks, callbacks); `start`
//! only has to hook them up and return.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::camera::VideoStream;
use crate::error::ScanResult;

/// Family of codes an engine decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EngineKind {
    /// 1D barcodes: EAN-8/13, UPC-A/E, Code 128, Code 39.
    Linear,
    /// 2D codes: QR and other matrix symbologies.
    Matrix,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Linear => f.write_str("linear"),
            EngineKind::Matrix => f.write_str("matrix"),
        }
    }
}

/// One raw decode result, before duplicate suppression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub code: String,
    pub engine: EngineKind,
    /// When the engine reported it. Duplicate suppression runs on this,
    /// not on when the consumer gets around to reading it.
    pub at: Instant,
}

/// Where an engine sends what it decodes.
#[derive(Debug, Clone)]
pub struct DetectionSink {
    engine: EngineKind,
    tx: mpsc::UnboundedSender<Detection>,
}

impl DetectionSink {
    pub(crate) fn new(engine: EngineKind, tx: mpsc::UnboundedSender<Detection>) -> Self {
        DetectionSink { engine, tx }
    }

    /// Forwards a decoded code. Empty codes are dropped.
    ///
    /// Returns `false` once the subscription is gone.
    pub fn emit(&self, code: impl Into<String>) -> bool {
        let code = code.into();
        if code.is_empty() {
            return !self.tx.is_closed();
        }
        self.tx
            .send(Detection {
                code,
                engine: self.engine,
                at: Instant::now(),
            })
            .is_ok()
    }
}

/// A barcode decoding library bound to a video stream.
pub trait DecoderEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Begins decoding frames from `stream`, reporting codes to `sink`.
    ///
    /// ## Errors
    /// - `ScanError::DecoderInit` if the library cannot start
    fn start(&self, stream: Arc<dyn VideoStream>, sink: DetectionSink) -> ScanResult<()>;

    /// Stops decoding. Must not touch the stream; the adapter releases it.
    fn stop(&self);
}
