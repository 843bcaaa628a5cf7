//! # Session Store
//!
//! Typed persistence of a scan session over the key/value table.
//!
//! ## Key Layout
//! ```text
//! ┌────────────────────┬───────────────────────────────────────────────┐
//! │ key                │ value                                         │
//! ├────────────────────┼───────────────────────────────────────────────┤
//! │ entries            │ JSON [{code, quantity, price_cents}, ...]     │
//! │ batches            │ JSON [{id, header, items}, ...]               │
//! │ header_logDate     │ raw text, absent when blank                   │
//! │ header_storeName   │ raw text, absent when blank                   │
//! │ header_discount    │ raw text, absent when blank                   │
//! │ scanMode           │ "1d" | "2d" | "all"                           │
//! └────────────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! Unreadable values never block startup: they are logged and treated as
//! absent.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use scanlog_core::{
    Batch, BatchArchive, Entry, HeaderDraft, HeaderField, Ledger, PriceMergePolicy, ScanMode,
    Session,
};

use crate::error::{DbError, DbResult};
use crate::repository::kv::KvRepository;

/// Persisted key names.
pub mod keys {
    use scanlog_core::HeaderField;

    pub const ENTRIES: &str = "entries";
    pub const BATCHES: &str = "batches";
    pub const HEADER_DATE: &str = "header_logDate";
    pub const HEADER_STORE: &str = "header_storeName";
    pub const HEADER_DISCOUNT: &str = "header_discount";
    pub const SCAN_MODE: &str = "scanMode";

    pub fn header(field: HeaderField) -> &'static str {
        match field {
            HeaderField::Date => HEADER_DATE,
            HeaderField::Store => HEADER_STORE,
            HeaderField::Discount => HEADER_DISCOUNT,
        }
    }

    /// Everything `clear_session` removes. The scan mode preference stays.
    pub const SESSION: [&str; 5] = [ENTRIES, BATCHES, HEADER_DATE, HEADER_STORE, HEADER_DISCOUNT];
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    kv: KvRepository,
}

impl SessionStore {
    pub fn new(kv: KvRepository) -> Self {
        SessionStore { kv }
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Loads ledger, archive and header draft.
    pub async fn load_session(&self, policy: PriceMergePolicy) -> DbResult<Session> {
        let entries: Vec<Entry> = self.load_json(keys::ENTRIES).await?.unwrap_or_default();
        let batches: Vec<Batch> = self.load_json(keys::BATCHES).await?.unwrap_or_default();
        let header = self.load_header().await?;

        debug!(
            entries = entries.len(),
            batches = batches.len(),
            "Session loaded"
        );

        Ok(Session {
            ledger: Ledger::from_entries(entries, policy),
            archive: BatchArchive::from_batches(batches),
            header,
        })
    }

    pub async fn load_header(&self) -> DbResult<HeaderDraft> {
        let mut header = HeaderDraft::default();
        for field in HeaderField::ALL {
            let key = keys::header(field);
            if let Some(raw) = self.kv.get(key).await? {
                if let Err(e) = header.set(field, &raw) {
                    warn!(key = %key, error = %e, "Ignoring invalid stored header field");
                }
            }
        }
        Ok(header)
    }

    /// Stored scan mode, or `None` if never saved or unreadable.
    pub async fn load_scan_mode(&self) -> DbResult<Option<ScanMode>> {
        let Some(raw) = self.kv.get(keys::SCAN_MODE).await? else {
            return Ok(None);
        };
        match raw.parse::<ScanMode>() {
            Ok(mode) => Ok(Some(mode)),
            Err(e) => {
                warn!(value = %raw, error = %e, "Ignoring invalid stored scan mode");
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Save
    // =========================================================================

    pub async fn save_ledger(&self, ledger: &Ledger) -> DbResult<()> {
        self.kv
            .set(keys::ENTRIES, &encode(keys::ENTRIES, ledger.entries())?)
            .await
    }

    pub async fn save_archive(&self, archive: &BatchArchive) -> DbResult<()> {
        self.kv
            .set(keys::BATCHES, &encode(keys::BATCHES, archive.batches())?)
            .await
    }

    /// Writes ledger and archive in one transaction, so closing or
    /// restoring a batch is never half-persisted.
    pub async fn save_ledger_and_archive(
        &self,
        ledger: &Ledger,
        archive: &BatchArchive,
    ) -> DbResult<()> {
        self.kv
            .write_many(&[
                (keys::ENTRIES, Some(encode(keys::ENTRIES, ledger.entries())?)),
                (keys::BATCHES, Some(encode(keys::BATCHES, archive.batches())?)),
            ])
            .await
    }

    /// Persists one header field. Blank values remove the key.
    pub async fn save_header_field(&self, field: HeaderField, value: Option<&str>) -> DbResult<()> {
        let key = keys::header(field);
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => self.kv.set(key, value).await,
            None => self.kv.remove(key).await.map(|_| ()),
        }
    }

    pub async fn save_scan_mode(&self, mode: ScanMode) -> DbResult<()> {
        self.kv.set(keys::SCAN_MODE, mode.as_str()).await
    }

    /// Removes ledger, batches and header fields.
    pub async fn clear_session(&self) -> DbResult<()> {
        let writes: Vec<_> = keys::SESSION.iter().map(|key| (*key, None)).collect();
        self.kv.write_many(&writes).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored value is not valid JSON, treating as empty");
                Ok(None)
            }
        }
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::serialization(key, e))
}
