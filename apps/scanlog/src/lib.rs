//! # scanlog
//!
//! Scan or type barcodes into a running list, close the list into dated
//! batches, export batches as spreadsheets.
//!
//! ## Module Organization
//! ```text
//! scanlog/
//! ├── lib.rs          ◄─── You are here (wiring & tracing)
//! ├── main.rs         ◄─── clap entry point
//! ├── commands/       ◄─── One handler per CLI subcommand
//! ├── controller.rs   ◄─── SessionController: the whole session state machine
//! ├── export.rs       ◄─── xlsx / csv spreadsheet sinks
//! ├── config.rs       ◄─── scanlog.toml + SCANLOG_* overrides
//! ├── confirm.rs      ◄─── Yes/no prompts for destructive operations
//! └── error.rs        ◄─── AppError + ErrorCode
//! ```
//!
//! ## Startup Sequence
//! ```text
//! AppConfig::load ──► Database::new (migrations) ──► SessionController::open
//!                                                        │
//!                     FixedCamera + ManualFeed engines ──┘ (stdin scanning)
//! ```

pub mod commands;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod error;
pub mod export;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scanlog_scan::{AdapterConfig, DecoderAdapter, EngineKind, FeedHandle, FixedCamera, ManualFeed};
use scanlog_store::{Database, DbConfig};

pub use config::AppConfig;
pub use confirm::{AutoConfirm, Confirm, StdinConfirm};
pub use controller::{CloseOutcome, ControllerOptions, ScanStatus, SessionController, SessionSummary};
pub use error::{AppError, AppResult, ErrorCode};
pub use export::{CsvSink, ExportFormat, SpreadsheetSink, XlsxSink};

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=scanlog_scan=trace` - Show suppressed duplicates
/// - Default: `info,scanlog=debug,sqlx=warn`
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scanlog=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Push side of the keyboard-wedge engines used by the command line.
#[derive(Debug, Clone)]
pub struct Feeds {
    pub linear: FeedHandle,
    pub matrix: FeedHandle,
}

impl Feeds {
    /// Delivers a code to whichever engine is running.
    pub fn push(&self, code: &str) -> bool {
        self.linear.push(code) || self.matrix.push(code)
    }
}

/// A fully wired application.
pub struct App {
    pub config: AppConfig,
    pub db: Database,
    pub controller: SessionController,
    pub feeds: Feeds,
}

impl App {
    /// Opens the database and the saved session.
    ///
    /// There is no camera on a terminal: scanning uses [`FixedCamera`] and
    /// two [`ManualFeed`] engines fed from stdin by `scanlog scan`.
    pub async fn open(config: AppConfig, confirm: Box<dyn Confirm>) -> AppResult<Self> {
        info!(db = %config.storage.db_path.display(), "Opening scanlog");

        let db = Database::new(DbConfig::new(&config.storage.db_path)).await?;

        let linear = ManualFeed::new(EngineKind::Linear);
        let matrix = ManualFeed::new(EngineKind::Matrix);
        let feeds = Feeds {
            linear: linear.handle(),
            matrix: matrix.handle(),
        };

        let adapter = DecoderAdapter::new(Arc::new(FixedCamera::new()), AdapterConfig::default())
            .with_engine(Arc::new(linear))
            .with_engine(Arc::new(matrix));
        let sink = export::sink_for(config.export.format, &config.export.dir);

        let controller = SessionController::open(
            db.session(),
            adapter,
            sink,
            confirm,
            ControllerOptions::from(&config),
        )
        .await?;

        Ok(App {
            config,
            db,
            controller,
            feeds,
        })
    }

    pub async fn close(self) {
        let App { controller, db, .. } = self;
        drop(controller);
        db.close().await;
    }
}
