//! # Session Controller
//!
//! Glue between the decoder adapter, the ledger/archive and the store.
//! Every mutating operation persists before it returns.
//!
//! Mutations are staged on a copy and only replace the live session once
//! the store write succeeded, so a failed write leaves memory and disk in
//! agreement.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌─────────┐ start_scanning / toggle_camera  ┌──────────┐             │
//! │   │ Stopped │────────────────────────────────►│ Scanning │◄──┐         │
//! │   │         │◄────────────────────────────────│          │   │         │
//! │   └─────────┘ stop_scanning / camera failure  └────┬─────┘   │         │
//! │                                                     │ pump()  │         │
//! │                                                     ▼         │         │
//! │                                           scan_detected(code)─┘         │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                           ledger.add_or_increment(code, 1, 0)          │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                                        store.save_ledger(...)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ledger, archive and header operations work the same in both states.

use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use scanlog_core::validation::{parse_price, parse_quantity, validate_code};
use scanlog_core::{
    Batch, BatchId, CameraFacing, CoreError, Entry, HeaderDraft, HeaderField, Ledger, LedgerField,
    Money, PriceMergePolicy, ScanMode, Session,
};
use scanlog_scan::{AdapterStatus, DecoderAdapter, EngineKind, ScanSubscription};
use scanlog_store::SessionStore;

use crate::config::AppConfig;
use crate::confirm::Confirm;
use crate::error::AppResult;
use crate::export::SpreadsheetSink;

/// What the status line shows.
pub type ScanStatus = AdapterStatus;

// =============================================================================
// Options
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub price_merge: PriceMergePolicy,
    /// Used when no mode has been saved yet.
    pub default_mode: ScanMode,
    pub default_facing: CameraFacing,
    pub debounce: Duration,
    pub auto_export_on_close: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        ControllerOptions::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ControllerOptions {
    fn from(config: &AppConfig) -> Self {
        ControllerOptions {
            price_merge: config.ledger.price_merge,
            default_mode: config.scan.default_mode,
            default_facing: config.scan.default_facing,
            debounce: config.debounce(),
            auto_export_on_close: config.export.auto_export_on_close,
        }
    }
}

/// Result of closing a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOutcome {
    pub id: BatchId,
    /// File written by the automatic export, if it ran and succeeded.
    pub exported: Option<PathBuf>,
}

/// Counts for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub status: ScanStatus,
    pub mode: ScanMode,
    pub facing: CameraFacing,
    pub entries: usize,
    pub total_quantity: i64,
    pub total_value: Money,
    pub batches: usize,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

// =============================================================================
// Controller
// =============================================================================

pub struct SessionController {
    session: Session,
    store: SessionStore,
    adapter: DecoderAdapter,
    subscription: Option<ScanSubscription>,
    sink: Box<dyn SpreadsheetSink>,
    confirm: Box<dyn Confirm>,
    auto_export_on_close: bool,
    today: fn() -> NaiveDate,
}

impl SessionController {
    /// Loads the saved session and scan mode and prepares the adapter.
    /// Scanning is not started.
    pub async fn open(
        store: SessionStore,
        mut adapter: DecoderAdapter,
        sink: Box<dyn SpreadsheetSink>,
        confirm: Box<dyn Confirm>,
        options: ControllerOptions,
    ) -> AppResult<Self> {
        let session = store.load_session(options.price_merge).await?;
        let mode = store
            .load_scan_mode()
            .await?
            .unwrap_or(options.default_mode);

        adapter.stop();
        adapter.set_debounce(options.debounce);
        adapter.configure(mode, options.default_facing)?;

        info!(
            entries = session.ledger.len(),
            batches = session.archive.len(),
            mode = %mode,
            "Session opened"
        );

        Ok(SessionController {
            session,
            store,
            adapter,
            subscription: None,
            sink,
            confirm,
            auto_export_on_close: options.auto_export_on_close,
            today: utc_today,
        })
    }

    /// Overrides the clock used for default header dates.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    pub fn start_scanning(&mut self) -> AppResult<()> {
        self.subscription = None;
        match self.adapter.start() {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, recoverable = e.is_recoverable(), "Could not start scanning");
                Err(e.into())
            }
        }
    }

    pub fn stop_scanning(&mut self) {
        self.adapter.stop();
        self.subscription = None;
    }

    /// Flips between front and back camera and (re)starts scanning.
    pub fn toggle_camera(&mut self) -> AppResult<CameraFacing> {
        let config = self.adapter.config();
        let facing = config.facing.flipped();
        self.stop_scanning();
        self.adapter.configure(config.mode, facing)?;
        self.start_scanning()?;
        debug!(facing = %facing, "Camera toggled");
        Ok(facing)
    }

    /// Persists the mode and restarts the adapter if it is running.
    pub async fn switch_mode(&mut self, mode: ScanMode) -> AppResult<()> {
        self.store.save_scan_mode(mode).await?;

        let facing = self.adapter.config().facing;
        match self.adapter.configure(mode, facing) {
            Ok(Some(subscription)) => self.subscription = Some(subscription),
            Ok(None) => {}
            Err(e) => {
                self.subscription = None;
                warn!(error = %e, mode = %mode, "Restart after mode switch failed");
                return Err(e.into());
            }
        }

        info!(mode = %mode, engines = ?self.adapter.active_engines(), "Scan mode switched");
        Ok(())
    }

    /// Waits for the next scanned code and records it.
    ///
    /// Returns `None` when not scanning or once scanning stops.
    pub async fn pump(&mut self) -> AppResult<Option<String>> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(None);
        };
        match subscription.next().await {
            Some(code) => {
                self.scan_detected(&code).await?;
                Ok(Some(code))
            }
            None => {
                self.subscription = None;
                Ok(None)
            }
        }
    }

    /// Records every code already waiting, without blocking.
    pub async fn pump_pending(&mut self) -> AppResult<usize> {
        let mut count = 0;
        loop {
            let next = match self.subscription.as_mut() {
                Some(subscription) => subscription.try_next(),
                None => None,
            };
            let Some(code) = next else {
                return Ok(count);
            };
            if self.scan_detected(&code).await? {
                count += 1;
            }
        }
    }

    /// Adds one unit of `code` at price zero. Blank codes are ignored.
    pub async fn scan_detected(&mut self, code: &str) -> AppResult<bool> {
        if code.trim().is_empty() {
            return Ok(false);
        }
        let mut ledger = self.session.ledger.clone();
        ledger.add_or_increment(code, 1, Money::zero());
        self.commit_ledger(ledger).await?;
        info!(code = %code, "Scanned");
        Ok(true)
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    /// Adds a manually typed entry. Nothing changes if any field is invalid.
    ///
    /// ## Defaults
    /// - blank quantity → 1
    /// - blank price → 0
    pub async fn add_manual(&mut self, code: &str, quantity: &str, price: &str) -> AppResult<()> {
        let code = validate_code(code)?;
        let quantity = parse_quantity(quantity)?;
        let price = parse_price(price)?;

        let mut ledger = self.session.ledger.clone();
        ledger.add_or_increment(&code, quantity, price);
        self.commit_ledger(ledger).await?;

        debug!(code = %code, quantity, price = %price, "Manual entry added");
        Ok(())
    }

    /// Inline edit. Unparsable input is coerced, never rejected.
    pub async fn edit_entry(&mut self, index: usize, field: LedgerField, raw: &str) -> AppResult<()> {
        let mut ledger = self.session.ledger.clone();
        ledger.edit_field(index, field, raw)?;
        self.commit_ledger(ledger).await?;
        debug!(index, ?field, "Entry edited");
        Ok(())
    }

    /// Removes an entry after confirmation. `Ok(false)` when declined.
    pub async fn remove_entry(&mut self, index: usize) -> AppResult<bool> {
        let code = match self.session.ledger.get(index) {
            Some(entry) => entry.code.clone(),
            None => return Err(CoreError::EntryNotFound(index).into()),
        };
        if !self.confirm.confirm(&format!("Remove entry {}?", code)) {
            return Ok(false);
        }

        let mut ledger = self.session.ledger.clone();
        ledger.remove(index)?;
        self.commit_ledger(ledger).await?;
        debug!(index, code = %code, "Entry removed");
        Ok(true)
    }

    // =========================================================================
    // Header
    // =========================================================================

    /// Validates and persists one header field. Blank clears it.
    pub async fn set_header_field(&mut self, field: HeaderField, raw: &str) -> AppResult<()> {
        let mut header = self.session.header.clone();
        header.set(field, raw)?;
        self.store.save_header_field(field, header.get(field)).await?;
        self.session.header = header;
        debug!(?field, value = ?self.session.header.get(field), "Header field set");
        Ok(())
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Freezes the ledger into a new batch and clears it.
    ///
    /// ## Errors
    /// - `CoreError::EmptyLedger`: nothing changes
    pub async fn close_batch(&mut self) -> AppResult<CloseOutcome> {
        let mut staged = self.session.clone();
        let id = staged.close_batch((self.today)())?;
        self.store
            .save_ledger_and_archive(&staged.ledger, &staged.archive)
            .await?;
        self.session = staged;

        info!(batch = %id, "Batch closed");

        let exported = if self.auto_export_on_close {
            match self.export_batch(id) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(batch = %id, error = %e, "Automatic export failed");
                    None
                }
            }
        } else {
            None
        };

        Ok(CloseOutcome { id, exported })
    }

    /// Replaces the ledger with a batch's items. The batch is kept.
    pub async fn restore_batch(&mut self, id: BatchId) -> AppResult<bool> {
        if self.session.archive.get(id).is_none() {
            return Err(CoreError::BatchNotFound(id).into());
        }
        if !self
            .confirm
            .confirm(&format!("Restore batch {} and replace current entries?", id))
        {
            return Ok(false);
        }

        let mut ledger = self.session.ledger.clone();
        self.session.archive.restore(id, &mut ledger)?;
        self.commit_ledger(ledger).await?;
        info!(batch = %id, entries = self.session.ledger.len(), "Batch restored");
        Ok(true)
    }

    pub async fn delete_batch(&mut self, id: BatchId) -> AppResult<bool> {
        if self.session.archive.get(id).is_none() {
            return Err(CoreError::BatchNotFound(id).into());
        }
        if !self.confirm.confirm(&format!("Delete batch {} permanently?", id)) {
            return Ok(false);
        }

        let mut archive = self.session.archive.clone();
        archive.delete(id)?;
        self.store.save_archive(&archive).await?;
        self.session.archive = archive;
        info!(batch = %id, "Batch deleted");
        Ok(true)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Exports the live ledger with the current header values.
    pub fn export_current(&self) -> AppResult<PathBuf> {
        let today = (self.today)();
        let sheet = self.session.current_sheet(today)?;
        self.sink.write(&sheet, &sheet.file_stem(today))
    }

    pub fn export_batch(&self, id: BatchId) -> AppResult<PathBuf> {
        let sheet = self.session.batch_sheet(id)?;
        self.sink.write(&sheet, &sheet.file_stem((self.today)()))
    }

    // =========================================================================
    // Clear
    // =========================================================================

    /// Forgets entries, batches and header fields. The scan mode stays.
    pub async fn clear_all(&mut self) -> AppResult<bool> {
        if !self
            .confirm
            .confirm("Clear all entries and batches from local storage?")
        {
            return Ok(false);
        }

        self.store.clear_session().await?;
        self.session.clear_all();
        info!("Session cleared");
        Ok(true)
    }

    async fn commit_ledger(&mut self, ledger: Ledger) -> AppResult<()> {
        self.store.save_ledger(&ledger).await?;
        self.session.ledger = ledger;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn status(&self) -> ScanStatus {
        self.adapter.status()
    }

    pub fn summary(&self) -> SessionSummary {
        let config = self.adapter.config();
        SessionSummary {
            status: self.status(),
            mode: config.mode,
            facing: config.facing,
            entries: self.session.ledger.len(),
            total_quantity: self.session.ledger.total_quantity(),
            total_value: self.session.ledger.total_value(),
            batches: self.session.archive.len(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        self.session.ledger.entries()
    }

    pub fn batches(&self) -> &[Batch] {
        self.session.archive.batches()
    }

    pub fn header(&self) -> &HeaderDraft {
        &self.session.header
    }

    pub fn mode(&self) -> ScanMode {
        self.adapter.config().mode
    }

    pub fn active_engines(&self) -> Vec<EngineKind> {
        self.adapter.active_engines()
    }

    pub fn is_scanning(&self) -> bool {
        self.adapter.is_running()
    }
}
