//! Bad-posture duration tracking and alert cooldown.

use std::time::{Duration, Instant};

/// Result of feeding one evaluated frame to the [`AlertTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTick {
    /// Posture is good; the bad-posture timer is hidden.
    Good,
    /// Posture is bad and has been for `elapsed`. `fire` is set when an alert is due.
    Bad { elapsed: Duration, fire: bool },
}

/// Tracks how long posture has been bad and when the last alert went off.
///
/// An alert fires once bad posture has lasted at least the interval, and then
/// at most once per interval while it stays bad. A good frame clears the
/// bad-posture start; the cooldown survives it.
#[derive(Debug, Clone, Default)]
pub struct AlertTimer {
    bad_since: Option<Instant>,
    last_alert: Option<Instant>,
}

impl AlertTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, is_good: bool, now: Instant, interval: Duration) -> AlertTick {
        if is_good {
            self.bad_since = None;
            return AlertTick::Good;
        }

        let start = *self.bad_since.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start);

        let cooled_down = self
            .last_alert
            .map_or(true, |last| now.saturating_duration_since(last) >= interval);

        let fire = elapsed >= interval && cooled_down;
        if fire {
            self.last_alert = Some(now);
        }

        AlertTick::Bad { elapsed, fire }
    }

    pub fn bad_since(&self) -> Option<Instant> {
        self.bad_since
    }

    pub fn last_alert(&self) -> Option<Instant> {
        self.last_alert
    }
}
