//! # Duplicate Suppression
//!
//! A code identical to the last *admitted* code is dropped until the
//! window has passed since that admission. Dropped repeats do not extend
//! the window.

use std::time::Duration;

use tokio::time::Instant;

/// Default suppression window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(900);

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer { window, last: None }
    }

    /// Decides whether `code`, seen at `now`, is a new scan.
    pub fn admit(&mut self, code: &str, now: Instant) -> bool {
        if let Some((last, at)) = &self.last {
            if last == code && now.saturating_duration_since(*at) < self.window {
                return false;
            }
        }
        self.last = Some((code.to_string(), now));
        true
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_within_window_is_dropped() {
        let start = Instant::now();
        let mut d = Debouncer::default();

        assert!(d.admit("A", start));
        assert!(!d.admit("A", start + Duration::from_millis(100)));
        assert!(!d.admit("A", start + Duration::from_millis(899)));
        assert!(d.admit("A", start + Duration::from_millis(900)));
    }

    #[test]
    fn test_dropped_repeat_does_not_extend_window() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));

        assert!(d.admit("A", start));
        assert!(!d.admit("A", start + Duration::from_millis(400)));
        assert!(d.admit("A", start + Duration::from_millis(600)));
    }

    #[test]
    fn test_different_code_always_admitted() {
        let start = Instant::now();
        let mut d = Debouncer::default();

        assert!(d.admit("A", start));
        assert!(d.admit("B", start));
        // "A" is no longer the last admitted code
        assert!(d.admit("A", start));
    }
}
