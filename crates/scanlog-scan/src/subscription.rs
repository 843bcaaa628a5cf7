//! # Scan Subscription
//!
//! The consumer end of one scanning session. Ends when the adapter stops
//! or restarts; a restart hands out a fresh subscription with clean
//! duplicate-suppression state.
//!
//! Repeats are judged by the time each detection was emitted, so a
//! consumer that falls behind does not turn one frame into two scans.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::trace;

use crate::debounce::Debouncer;
use crate::engine::Detection;

#[derive(Debug)]
pub struct ScanSubscription {
    rx: mpsc::UnboundedReceiver<Detection>,
    stopped: watch::Receiver<bool>,
    debouncer: Debouncer,
}

impl ScanSubscription {
    pub(crate) fn new(
        rx: mpsc::UnboundedReceiver<Detection>,
        stopped: watch::Receiver<bool>,
        window: Duration,
    ) -> Self {
        ScanSubscription {
            rx,
            stopped,
            debouncer: Debouncer::new(window),
        }
    }

    /// Waits for the next admitted code. `None` once scanning has stopped.
    pub async fn next(&mut self) -> Option<String> {
        loop {
            if self.is_closed() {
                return None;
            }
            tokio::select! {
                biased;
                changed = self.stopped.changed() => {
                    if changed.is_err() || *self.stopped.borrow() {
                        return None;
                    }
                }
                detection = self.rx.recv() => {
                    let detection = detection?;
                    if let Some(code) = self.admit(detection) {
                        return Some(code);
                    }
                }
            }
        }
    }

    /// Returns the next admitted code already queued, without waiting.
    pub fn try_next(&mut self) -> Option<String> {
        while !self.is_closed() {
            let detection = self.rx.try_recv().ok()?;
            if let Some(code) = self.admit(detection) {
                return Some(code);
            }
        }
        None
    }

    /// Whether the adapter has stopped this session.
    pub fn is_closed(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Stops listening. The adapter keeps running until `stop()`.
    pub fn unsubscribe(self) {
        drop(self);
    }

    fn admit(&mut self, detection: Detection) -> Option<String> {
        if self.debouncer.admit(&detection.code, detection.at) {
            Some(detection.code)
        } else {
            trace!(code = %detection.code, engine = %detection.engine, "Duplicate suppressed");
            None
        }
    }
}
