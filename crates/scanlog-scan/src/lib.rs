//! # scanlog-scan: Decoder Adapter
//!
//! Wraps a camera and up to two barcode decoding engines behind one
//! start/stop switch and one de-duplicated stream of codes.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CameraProvider::open(facing)                                          │
//! │        │ one VideoStream                                                │
//! │        ├─────────────────────┐                                          │
//! │        ▼                     ▼                                          │
//! │  linear engine (1D)    matrix engine (2D)     ← chosen by ScanMode     │
//! │        │                     │                                          │
//! │        └────────┬────────────┘                                          │
//! │                 ▼ mpsc                                                  │
//! │        ScanSubscription ── Debouncer (900 ms) ──► codes                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`adapter`] - Start/stop/configure state machine
//! - [`camera`] - Stream provider seam + [`FixedCamera`]
//! - [`engine`] - Decoder engine seam
//! - [`feed`] - [`ManualFeed`], an engine driven by pushed codes
//! - [`debounce`] - Duplicate suppression
//! - [`subscription`] - Consumer side of a scanning session

pub mod adapter;
pub mod camera;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod feed;
pub mod subscription;

pub use adapter::{AdapterConfig, AdapterStatus, DecoderAdapter};
pub use camera::{CameraProvider, FixedCamera, VideoStream};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use engine::{DecoderEngine, Detection, DetectionSink, EngineKind};
pub use error::{ScanError, ScanResult};
pub use feed::{FeedHandle, ManualFeed};
pub use subscription::ScanSubscription;
