//! # Session
//!
//! The whole mutable state of one scan session in a single value: live
//! ledger, closed batches, header draft. The controller owns exactly one.

use chrono::NaiveDate;

use crate::archive::BatchArchive;
use crate::error::CoreResult;
use crate::export::ExportSheet;
use crate::ledger::Ledger;
use crate::types::{BatchHeader, BatchId, HeaderDraft};
use crate::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub ledger: Ledger,
    pub archive: BatchArchive,
    pub header: HeaderDraft,
}

impl Session {
    /// Header as it would be frozen right now.
    pub fn current_header(&self, today: NaiveDate) -> CoreResult<BatchHeader> {
        Ok(self.header.resolve(today)?)
    }

    /// Closes the ledger into a batch stamped with the current header.
    pub fn close_batch(&mut self, today: NaiveDate) -> CoreResult<BatchId> {
        if self.ledger.is_empty() {
            return Err(CoreError::EmptyLedger);
        }
        let header = self.current_header(today)?;
        self.archive.close(&mut self.ledger, header)
    }

    /// Sheet for the live ledger; fails when there is nothing to export.
    pub fn current_sheet(&self, today: NaiveDate) -> CoreResult<ExportSheet> {
        if self.ledger.is_empty() {
            return Err(CoreError::NothingToExport);
        }
        Ok(ExportSheet::for_ledger(&self.ledger, &self.current_header(today)?))
    }

    /// Sheet for an archived batch.
    pub fn batch_sheet(&self, id: BatchId) -> CoreResult<ExportSheet> {
        self.archive
            .get(id)
            .map(ExportSheet::for_batch)
            .ok_or(CoreError::BatchNotFound(id))
    }

    /// Forgets everything: ledger, batches and header fields.
    pub fn clear_all(&mut self) {
        self.ledger.clear();
        self.archive.clear();
        self.header.clear();
    }
}
