// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Cancelable deferred call: only the last value handed in within the
//! window is delivered.

use std::time::{Duration, Instant};

/// Default window for settings edits
pub const DEFAULT_EDIT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds back a value until no newer value has arrived for `window`
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace any pending value and restart the window
    pub fn call(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// Take the pending value once its window has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, due)) if due <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drop the pending value
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_EDIT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_last_call_wins() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));

        debouncer.call("01:0", t0);
        debouncer.call("01:00", t0 + ms(100));
        debouncer.call("01:00.5", t0 + ms(200));

        assert_eq!(debouncer.poll(t0 + ms(300)), None);
        assert_eq!(debouncer.next_deadline(), Some(t0 + ms(500)));
        assert_eq!(debouncer.poll(t0 + ms(500)), Some("01:00.5"));
        assert_eq!(debouncer.poll(t0 + ms(900)), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::default();
        assert_eq!(debouncer.window(), ms(300));

        debouncer.call(7, t0);
        assert_eq!(debouncer.cancel(), Some(7));
        assert_eq!(debouncer.poll(t0 + ms(1000)), None);
        assert_eq!(debouncer.next_deadline(), None);
    }
}
