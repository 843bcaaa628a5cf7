//! # Batch Archive
//!
//! Append-only list of closed batches.
//!
//! ## Close / Restore
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Ledger [A×2, B×1] ──close(header)──► Archive [.., Batch{n, header,   │
//! │        │                                             [A×2, B×1]}]       │
//! │        ▼                                                                │
//! │   Ledger []                                                             │
//! │                                                                         │
//! │   Archive Batch{n} ──restore(n)──► Ledger = copy of items               │
//! │                                    (Batch{n} stays in the archive)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ledger::Ledger;
use crate::types::{Batch, BatchHeader, BatchId};

/// Closed batches in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchArchive {
    batches: Vec<Batch>,
}

impl BatchArchive {
    pub fn from_batches(batches: Vec<Batch>) -> Self {
        BatchArchive { batches }
    }

    /// Id the next closed batch will get: max existing + 1, or 1.
    pub fn next_id(&self) -> BatchId {
        self.batches
            .iter()
            .map(|b| b.id)
            .max()
            .map(|id| id.next())
            .unwrap_or(BatchId::new(1))
    }

    /// Snapshots the ledger into a new batch and clears the ledger.
    ///
    /// ## Errors
    /// - `CoreError::EmptyLedger` if there is nothing to close; neither the
    ///   ledger nor the archive is touched.
    pub fn close(&mut self, ledger: &mut Ledger, header: BatchHeader) -> CoreResult<BatchId> {
        if ledger.is_empty() {
            return Err(CoreError::EmptyLedger);
        }

        let id = self.next_id();
        self.batches.push(Batch {
            id,
            header,
            items: ledger.snapshot(),
        });
        ledger.clear();

        Ok(id)
    }

    /// Replaces the ledger with a copy of the batch's items.
    /// The batch stays in the archive.
    pub fn restore(&self, id: BatchId, ledger: &mut Ledger) -> CoreResult<()> {
        let batch = self.get(id).ok_or(CoreError::BatchNotFound(id))?;
        ledger.replace(batch.items.clone());
        Ok(())
    }

    /// Removes the batch permanently.
    pub fn delete(&mut self, id: BatchId) -> CoreResult<Batch> {
        let pos = self
            .batches
            .iter()
            .position(|b| b.id == id)
            .ok_or(CoreError::BatchNotFound(id))?;
        Ok(self.batches.remove(pos))
    }

    pub fn get(&self, id: BatchId) -> Option<&Batch> {
        self.batches.iter().find(|b| b.id == id)
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }
}
