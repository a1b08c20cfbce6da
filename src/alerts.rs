use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Decides whether a block counts as a loud event.
pub struct DetectionPolicy {
    threshold: f32,
    min_trigger_rms: f32,
}

impl DetectionPolicy {
    pub fn new(threshold: f32, min_trigger_rms: f32) -> Self {
        Self {
            threshold,
            min_trigger_rms,
        }
    }

    /// Both tests must pass: loudness relative to the adaptive baseline, and
    /// an absolute floor so a near-silent room's noise floor cannot inflate
    /// the ratio into a trigger. Never fires while the baseline warms up.
    pub fn is_loud(&self, loudness: f32, baseline: f32, ready: bool) -> bool {
        ready && loudness > baseline * self.threshold && loudness > self.min_trigger_rms
    }
}

/// Enforces a minimum spacing between delivered notifications, no matter how
/// many loud events occur.
pub struct AlertThrottle {
    min_interval: Duration,
    last_notification: Option<Instant>,
}

impl AlertThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_notification: None,
        }
    }

    /// Permit or deny a notification at `now`. A permit records `now` in the
    /// same call; a deny leaves the state untouched. A gap exactly equal to
    /// the minimum interval is still throttled.
    pub fn try_notify(&mut self, now: Instant) -> bool {
        let permitted = match self.last_notification {
            None => true,
            Some(last) => now.duration_since(last) > self.min_interval,
        };

        if permitted {
            self.last_notification = Some(now);
        }
        permitted
    }
}

/// Severity chosen by the burst escalator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Normal,
    Burst,
}

/// Sliding window over delivered notifications. When enough of them land
/// inside the trailing window, the current one escalates to a burst alert.
///
/// Only permitted notifications enter the history; throttled detections must
/// never be recorded here.
pub struct BurstEscalator {
    window: Duration,
    burst_count: usize,
    history: VecDeque<Instant>,
}

impl BurstEscalator {
    pub fn new(window: Duration, burst_count: usize) -> Self {
        Self {
            window,
            burst_count,
            history: VecDeque::new(),
        }
    }

    /// Record a delivered notification at `now` and pick its severity.
    ///
    /// The window is a fixed look-back from `now`, pruned before counting so
    /// stale notifications cannot keep the count high indefinitely. The
    /// current notification counts toward the total, so with a count of 3 the
    /// third qualifying notification inside the window already escalates.
    pub fn classify(&mut self, now: Instant) -> AlertKind {
        self.history.push_back(now);

        while let Some(&oldest) = self.history.front() {
            if now.duration_since(oldest) > self.window {
                self.history.pop_front();
            } else {
                break;
            }
        }

        if self.history.len() < self.burst_count {
            AlertKind::Normal
        } else {
            AlertKind::Burst
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
