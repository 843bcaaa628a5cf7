//! # Decoder Adapter
//!
//! Owns the camera stream and the decoder engines for one scanner view.
//!
//! ## Lifecycle
//! ```text
//!            configure(mode, facing)
//!                  │ (restarts if running)
//!                  ▼
//!  ┌─────────┐  start()   ┌──────────────────────────────────────────┐
//!  │ Stopped │──────────►│ Scanning                                 │
//!  │         │◄──────────│  stream  ← camera.open(facing)           │
//!  └─────────┘  stop()    │  engines ← per mode, all on that stream  │
//!       ▲                 └──────────────────────────────────────────┘
//!       │ any failure: started engines stopped, stream released
//!       └──────────────────────────────────────────────────────────────
//! ```
//!
//! | mode  | engines          |
//! |-------|------------------|
//! | `1d`  | linear           |
//! | `2d`  | matrix           |
//! | `all` | linear + matrix  |

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use scanlog_core::{CameraFacing, ScanMode};

use crate::camera::{CameraProvider, VideoStream};
use crate::debounce::DEFAULT_DEBOUNCE;
use crate::engine::{DecoderEngine, DetectionSink, EngineKind};
use crate::error::{ScanError, ScanResult};
use crate::subscription::ScanSubscription;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterConfig {
    pub mode: ScanMode,
    pub facing: CameraFacing,
    /// Duplicate-suppression window.
    pub debounce: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        AdapterConfig {
            mode: ScanMode::default(),
            facing: CameraFacing::default(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// What the scanner view shows in its status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterStatus {
    Stopped,
    Scanning { mode: ScanMode, facing: CameraFacing },
}

impl fmt::Display for AdapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterStatus::Stopped => f.write_str("Stopped"),
            AdapterStatus::Scanning { mode, facing } => {
                let label = match mode {
                    ScanMode::OneD => "1D",
                    ScanMode::TwoD => "2D",
                    ScanMode::All => "1D+2D",
                };
                write!(f, "Scanning ({}, {} camera)", label, facing)
            }
        }
    }
}

// =============================================================================
// Adapter
// =============================================================================

struct Running {
    stream: Arc<dyn VideoStream>,
    engines: Vec<Arc<dyn DecoderEngine>>,
    stopped_tx: watch::Sender<bool>,
}

pub struct DecoderAdapter {
    camera: Arc<dyn CameraProvider>,
    linear: Option<Arc<dyn DecoderEngine>>,
    matrix: Option<Arc<dyn DecoderEngine>>,
    config: AdapterConfig,
    running: Option<Running>,
}

impl fmt::Debug for DecoderAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderAdapter")
            .field("config", &self.config)
            .field("active_engines", &self.active_engines())
            .finish()
    }
}

impl DecoderAdapter {
    pub fn new(camera: Arc<dyn CameraProvider>, config: AdapterConfig) -> Self {
        DecoderAdapter {
            camera,
            linear: None,
            matrix: None,
            config,
            running: None,
        }
    }

    /// Installs an engine in the slot matching its kind.
    pub fn with_engine(mut self, engine: Arc<dyn DecoderEngine>) -> Self {
        match engine.kind() {
            EngineKind::Linear => self.linear = Some(engine),
            EngineKind::Matrix => self.matrix = Some(engine),
        }
        self
    }

    pub fn config(&self) -> AdapterConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Engine families currently decoding. Empty when stopped.
    pub fn active_engines(&self) -> Vec<EngineKind> {
        self.running
            .as_ref()
            .map(|r| r.engines.iter().map(|e| e.kind()).collect())
            .unwrap_or_default()
    }

    pub fn status(&self) -> AdapterStatus {
        match self.running {
            Some(_) => AdapterStatus::Scanning {
                mode: self.config.mode,
                facing: self.config.facing,
            },
            None => AdapterStatus::Stopped,
        }
    }

    /// Applies new settings. While scanning this restarts, and the new
    /// subscription is returned.
    pub fn configure(
        &mut self,
        mode: ScanMode,
        facing: CameraFacing,
    ) -> ScanResult<Option<ScanSubscription>> {
        self.config.mode = mode;
        self.config.facing = facing;
        debug!(mode = %mode, facing = %facing, "Adapter configured");

        if self.is_running() {
            self.start().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn set_debounce(&mut self, window: Duration) {
        self.config.debounce = window;
    }

    /// Stops any current session and starts a new one.
    ///
    /// ## Errors
    /// Camera errors from the provider, `ScanError::EngineMissing` when the
    /// mode needs an engine that isn't installed, `ScanError::DecoderInit`
    /// when an engine fails. The adapter is stopped afterwards in all cases.
    pub fn start(&mut self) -> ScanResult<ScanSubscription> {
        self.stop();

        let wanted = self.engines_for(self.config.mode)?;
        let stream = self.camera.open(self.config.facing).map_err(|e| {
            warn!(error = %e, facing = %self.config.facing, "Camera open failed");
            e
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut started: Vec<Arc<dyn DecoderEngine>> = Vec::with_capacity(wanted.len());

        for engine in wanted {
            let sink = DetectionSink::new(engine.kind(), tx.clone());
            if let Err(e) = engine.start(stream.clone(), sink) {
                warn!(error = %e, "Decoder start failed, rolling back");
                for running in started.iter().rev() {
                    running.stop();
                }
                stream.release();
                return Err(e);
            }
            started.push(engine);
        }

        let (stopped_tx, stopped_rx) = watch::channel(false);

        info!(
            mode = %self.config.mode,
            facing = %self.config.facing,
            stream = %stream.label(),
            engines = started.len(),
            "Scanning started"
        );

        self.running = Some(Running {
            stream,
            engines: started,
            stopped_tx,
        });

        Ok(ScanSubscription::new(rx, stopped_rx, self.config.debounce))
    }

    /// Stops every engine and releases the stream. No-op when stopped.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        for engine in &running.engines {
            engine.stop();
        }
        running.stream.release();
        let _ = running.stopped_tx.send(true);

        info!("Scanning stopped");
    }

    fn engines_for(&self, mode: ScanMode) -> ScanResult<Vec<Arc<dyn DecoderEngine>>> {
        let mut engines = Vec::with_capacity(2);
        if mode.uses_linear() {
            engines.push(
                self.linear
                    .clone()
                    .ok_or(ScanError::EngineMissing(EngineKind::Linear))?,
            );
        }
        if mode.uses_matrix() {
            engines.push(
                self.matrix
                    .clone()
                    .ok_or(ScanError::EngineMissing(EngineKind::Matrix))?,
            );
        }
        Ok(engines)
    }
}

impl Drop for DecoderAdapter {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FixedCamera;
    use crate::feed::{FeedHandle, ManualFeed};
    use std::sync::Mutex;

    /// Camera that always fails with the given error.
    struct FailingCamera(ScanError);

    impl CameraProvider for FailingCamera {
        fn open(&self, _facing: CameraFacing) -> ScanResult<Arc<dyn VideoStream>> {
            Err(self.0.clone())
        }
    }

    /// Camera that logs every open and release in order.
    #[derive(Clone, Default)]
    struct LoggingCamera {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl LoggingCamera {
        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl CameraProvider for LoggingCamera {
        fn open(&self, facing: CameraFacing) -> ScanResult<Arc<dyn VideoStream>> {
            let mut log = self.log.lock().unwrap();
            let label = format!("{}-{}", facing, log.len());
            log.push(format!("open {}", label));
            Ok(Arc::new(LoggedStream {
                label,
                facing,
                log: self.log.clone(),
            }))
        }
    }

    struct LoggedStream {
        label: String,
        facing: CameraFacing,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl VideoStream for LoggedStream {
        fn label(&self) -> &str {
            &self.label
        }

        fn facing(&self) -> CameraFacing {
            self.facing
        }

        fn release(&self) {
            self.log.lock().unwrap().push(format!("release {}", self.label));
        }
    }

    fn logging_adapter(camera: &LoggingCamera) -> DecoderAdapter {
        DecoderAdapter::new(Arc::new(camera.clone()), AdapterConfig::default())
            .with_engine(Arc::new(ManualFeed::new(EngineKind::Linear)))
            .with_engine(Arc::new(ManualFeed::new(EngineKind::Matrix)))
    }

    struct Rig {
        adapter: DecoderAdapter,
        camera: FixedCamera,
        linear: FeedHandle,
        matrix: FeedHandle,
    }

    fn rig(mode: ScanMode) -> Rig {
        let camera = FixedCamera::new();
        let linear = ManualFeed::new(EngineKind::Linear);
        let matrix = ManualFeed::new(EngineKind::Matrix);
        let (lh, mh) = (linear.handle(), matrix.handle());
        let config = AdapterConfig {
            mode,
            ..Default::default()
        };
        let adapter = DecoderAdapter::new(Arc::new(camera.clone()), config)
            .with_engine(Arc::new(linear))
            .with_engine(Arc::new(matrix));
        Rig {
            adapter,
            camera,
            linear: lh,
            matrix: mh,
        }
    }

    #[tokio::test]
    async fn test_mode_selects_engines() {
        for (mode, expected) in [
            (ScanMode::OneD, vec![EngineKind::Linear]),
            (ScanMode::TwoD, vec![EngineKind::Matrix]),
            (ScanMode::All, vec![EngineKind::Linear, EngineKind::Matrix]),
        ] {
            let mut r = rig(mode);
            let _sub = r.adapter.start().unwrap();
            assert_eq!(r.adapter.active_engines(), expected, "mode {}", mode);
            assert_eq!(r.camera.opened(), 1);
        }
    }

    #[tokio::test]
    async fn test_all_mode_shares_one_stream() {
        let mut r = rig(ScanMode::All);
        let mut sub = r.adapter.start().unwrap();

        assert!(r.linear.push("L1"));
        assert!(r.matrix.push("Q1"));
        assert_eq!(sub.next().await.as_deref(), Some("L1"));
        assert_eq!(sub.next().await.as_deref(), Some("Q1"));
        assert_eq!(r.camera.opened(), 1);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut r = rig(ScanMode::All);
        let _sub = r.adapter.start().unwrap();

        r.adapter.stop();
        r.adapter.stop();

        assert_eq!(r.linear.stops(), 1);
        assert_eq!(r.matrix.stops(), 1);
        assert_eq!(r.camera.released(), 1);
        assert_eq!(r.adapter.status(), AdapterStatus::Stopped);
    }

    #[tokio::test]
    async fn test_restart_releases_previous_stream() {
        let mut r = rig(ScanMode::OneD);
        let mut first = r.adapter.start().unwrap();
        let _second = r.adapter.start().unwrap();

        assert_eq!(r.camera.opened(), 2);
        assert_eq!(r.camera.released(), 1);
        assert_eq!(first.next().await, None);
    }

    #[tokio::test]
    async fn test_restart_releases_before_reopening() {
        let camera = LoggingCamera::default();
        let mut adapter = logging_adapter(&camera);

        let _first = adapter.start().unwrap();
        let _second = adapter.start().unwrap();
        adapter.stop();

        assert_eq!(
            camera.log(),
            vec!["open back-0", "release back-0", "open back-2", "release back-2"]
        );
    }

    #[tokio::test]
    async fn test_configure_releases_before_reopening() {
        let camera = LoggingCamera::default();
        let mut adapter = logging_adapter(&camera);
        let _sub = adapter.start().unwrap();

        adapter.configure(ScanMode::All, CameraFacing::Front).unwrap();
        adapter.configure(ScanMode::OneD, CameraFacing::Front).unwrap();

        assert_eq!(
            camera.log(),
            vec![
                "open back-0",
                "release back-0",
                "open front-2",
                "release front-2",
                "open front-4",
            ]
        );
    }

    #[tokio::test]
    async fn test_subscription_ends_on_stop() {
        let mut r = rig(ScanMode::OneD);
        let mut sub = r.adapter.start().unwrap();
        r.linear.push("A");

        r.adapter.stop();

        assert!(sub.is_closed());
        assert_eq!(sub.next().await, None);
        assert!(!r.linear.push("B"));
    }

    #[tokio::test]
    async fn test_configure_while_scanning_restarts() {
        let mut r = rig(ScanMode::All);
        let _sub = r.adapter.start().unwrap();

        let sub = r
            .adapter
            .configure(ScanMode::OneD, CameraFacing::Front)
            .unwrap();

        assert!(sub.is_some());
        assert_eq!(r.adapter.active_engines(), vec![EngineKind::Linear]);
        assert!(!r.matrix.is_running());
        assert_eq!(r.matrix.stops(), 1);
        assert_eq!(
            r.adapter.status(),
            AdapterStatus::Scanning {
                mode: ScanMode::OneD,
                facing: CameraFacing::Front
            }
        );
    }

    #[tokio::test]
    async fn test_configure_while_stopped_does_not_start() {
        let mut r = rig(ScanMode::All);
        let sub = r.adapter.configure(ScanMode::TwoD, CameraFacing::Back).unwrap();

        assert!(sub.is_none());
        assert!(!r.adapter.is_running());
        assert_eq!(r.camera.opened(), 0);
    }

    #[tokio::test]
    async fn test_permission_denied_leaves_adapter_stopped() {
        let linear = ManualFeed::new(EngineKind::Linear);
        let handle = linear.handle();
        let mut adapter = DecoderAdapter::new(
            Arc::new(FailingCamera(ScanError::PermissionDenied)),
            AdapterConfig::default(),
        )
        .with_engine(Arc::new(linear))
        .with_engine(Arc::new(ManualFeed::new(EngineKind::Matrix)));

        let err = adapter.start().unwrap_err();
        assert_eq!(err, ScanError::PermissionDenied);
        assert!(err.is_recoverable());
        assert!(!adapter.is_running());
        assert_eq!(handle.starts(), 0);
    }

    #[tokio::test]
    async fn test_no_camera_is_distinct_and_recoverable() {
        let no_camera = ScanError::NoCamera {
            facing: CameraFacing::Front.to_string(),
        };
        let linear = ManualFeed::new(EngineKind::Linear);
        let handle = linear.handle();
        let mut adapter = DecoderAdapter::new(
            Arc::new(FailingCamera(no_camera.clone())),
            AdapterConfig {
                mode: ScanMode::OneD,
                facing: CameraFacing::Front,
                ..Default::default()
            },
        )
        .with_engine(Arc::new(linear));

        let err = adapter.start().unwrap_err();
        assert_eq!(err, no_camera);
        assert_ne!(err, ScanError::PermissionDenied);
        assert!(err.is_recoverable());
        assert_eq!(adapter.status(), AdapterStatus::Stopped);
        assert_eq!(handle.starts(), 0);
    }

    #[tokio::test]
    async fn test_engine_failure_rolls_back_and_can_restart() {
        let mut r = rig(ScanMode::All);
        r.matrix.fail_next_start("no wasm");

        let err = r.adapter.start().unwrap_err();
        assert!(matches!(
            err,
            ScanError::DecoderInit {
                engine: EngineKind::Matrix,
                ..
            }
        ));
        assert!(err.is_recoverable());
        assert!(!r.adapter.is_running());
        assert_eq!(r.linear.stops(), 1);
        assert_eq!(r.camera.released(), 1);

        let _sub = r.adapter.start().unwrap();
        assert_eq!(r.adapter.active_engines().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_engine_is_reported_before_camera_opens() {
        let camera = FixedCamera::new();
        let mut adapter = DecoderAdapter::new(Arc::new(camera.clone()), AdapterConfig::default())
            .with_engine(Arc::new(ManualFeed::new(EngineKind::Linear)));

        assert_eq!(
            adapter.start().unwrap_err(),
            ScanError::EngineMissing(EngineKind::Matrix)
        );
        assert_eq!(camera.opened(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_window() {
        let mut r = rig(ScanMode::OneD);
        let mut sub = r.adapter.start().unwrap();

        r.linear.push("A");
        r.linear.push("A");
        assert_eq!(sub.try_next().as_deref(), Some("A"));
        assert_eq!(sub.try_next(), None);

        tokio::time::advance(Duration::from_millis(950)).await;
        r.linear.push("A");
        assert_eq!(sub.try_next().as_deref(), Some("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_consumer_still_suppresses_same_frame_repeat() {
        let mut r = rig(ScanMode::All);
        let mut sub = r.adapter.start().unwrap();

        r.linear.push("A");
        r.matrix.push("A");
        assert_eq!(sub.try_next().as_deref(), Some("A"));

        // both were decoded at the same instant; reading late changes nothing
        tokio::time::advance(Duration::from_millis(2000)).await;
        assert_eq!(sub.try_next(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_clears_suppression() {
        let mut r = rig(ScanMode::OneD);
        let mut sub = r.adapter.start().unwrap();
        r.linear.push("A");
        assert_eq!(sub.try_next().as_deref(), Some("A"));

        let mut sub = r.adapter.start().unwrap();
        r.linear.push("A");
        assert_eq!(sub.try_next().as_deref(), Some("A"));
    }
}
