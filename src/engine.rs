use crate::alerts::{AlertKind, AlertThrottle, BurstEscalator, DetectionPolicy};
use crate::analyzer;
use crate::baseline::BaselineTracker;
use crate::config::MonitorConfig;
use crate::history::{EventLog, SignalHistory};
use crate::notifier::Notifier;
use log::{debug, info};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// What one block of audio amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Baseline not trusted yet; no detection ran.
    Warming,
    /// Detection ran, nothing loud.
    Quiet,
    /// Loud event inside the minimum notification interval; not delivered.
    Throttled,
    /// Loud event delivered to the notifier and logged.
    Notified(AlertKind),
}

/// Per-block orchestration: loudness metric, baseline update, detection,
/// throttling, burst escalation, and emission to the collaborators.
///
/// Owned by the audio callback; every step is synchronous and bounded so the
/// callback can never stall the capture pipeline. Shared history values each
/// sit behind their own mutex and are only appended to here.
pub struct DetectionEngine {
    tracker: BaselineTracker,
    policy: DetectionPolicy,
    throttle: AlertThrottle,
    escalator: BurstEscalator,
    tts_message: String,
    burst_alert_message: String,
    started: Instant,
    signal_history: Arc<Mutex<SignalHistory>>,
    event_log: Arc<Mutex<EventLog>>,
    notifier: Box<dyn Notifier>,
}

impl DetectionEngine {
    pub fn new(
        config: &MonitorConfig,
        signal_history: Arc<Mutex<SignalHistory>>,
        event_log: Arc<Mutex<EventLog>>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            tracker: BaselineTracker::new(config.alpha),
            policy: DetectionPolicy::new(config.threshold, config.min_trigger_rms),
            throttle: AlertThrottle::new(config.min_notification_interval()),
            escalator: BurstEscalator::new(config.burst_window(), config.burst_alert_count),
            tts_message: config.tts_message.clone(),
            burst_alert_message: config.burst_alert_message.clone(),
            started: Instant::now(),
            signal_history,
            event_log,
            notifier,
        }
    }

    /// Process one block of mono samples. Blocks arrive in strict temporal
    /// order and are never reprocessed.
    pub fn process_block(&mut self, block: &[f32]) -> BlockOutcome {
        self.process_block_at(block, Instant::now())
    }

    fn process_block_at(&mut self, block: &[f32], now: Instant) -> BlockOutcome {
        let rms = analyzer::block_rms(block);
        let (ema, ready) = self.tracker.update(rms);

        // The chart keeps updating even while the baseline warms up
        self.signal_history.lock().unwrap().push(rms, ema, ready);

        if !ready {
            debug!("RMS: {rms:.4}, warming up EMA");
            return BlockOutcome::Warming;
        }

        debug!("RMS: {rms:.4}, EMA: {ema:.4}");

        if !self.policy.is_loud(rms, ema, ready) {
            return BlockOutcome::Quiet;
        }

        info!("Loud noise detected (rms {rms:.4}, baseline {ema:.4})");

        if !self.throttle.try_notify(now) {
            debug!("Notification throttled");
            return BlockOutcome::Throttled;
        }

        let kind = self.escalator.classify(now);
        let message = match kind {
            AlertKind::Normal => self.tts_message.clone(),
            AlertKind::Burst => self.burst_alert_message.clone(),
        };

        self.notifier.notify(&message);
        self.event_log
            .lock()
            .unwrap()
            .push(now.duration_since(self.started), message);

        BlockOutcome::Notified(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct MockNotifier {
        delivered: Arc<Mutex<Vec<String>>>,
    }

    impl Notifier for MockNotifier {
        fn notify(&mut self, message: &str) {
            self.delivered.lock().unwrap().push(message.to_string());
        }
    }

    struct Harness {
        engine: DetectionEngine,
        signal_history: Arc<Mutex<SignalHistory>>,
        event_log: Arc<Mutex<EventLog>>,
        delivered: Arc<Mutex<Vec<String>>>,
    }

    fn harness(config: MonitorConfig) -> Harness {
        let signal_history = Arc::new(Mutex::new(SignalHistory::new(config.graph_history_length)));
        let event_log = Arc::new(Mutex::new(EventLog::new(config.event_log_limit)));
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let notifier = Box::new(MockNotifier {
            delivered: delivered.clone(),
        });
        let engine = DetectionEngine::new(&config, signal_history.clone(), event_log.clone(), notifier);
        Harness {
            engine,
            signal_history,
            event_log,
            delivered,
        }
    }

    fn test_config() -> MonitorConfig {
        MonitorConfig {
            alpha: 0.1,
            threshold: 4.0,
            min_trigger_rms: 0.01,
            min_notification_interval_seconds: 1.0,
            burst_alert_count: 3,
            burst_alert_window: 60.0,
            ..MonitorConfig::default()
        }
    }

    const SILENCE: [f32; 64] = [0.0; 64];
    const SPIKE: [f32; 64] = [0.5; 64];

    #[test]
    fn spike_after_warmup_notifies_exactly_once() {
        let mut h = harness(test_config());
        let t0 = Instant::now();
        let step = Duration::from_millis(500);

        // Seeding block plus ceil(1/0.1) = 10 warm-up blocks of silence
        for i in 0..11u32 {
            let outcome = h.engine.process_block_at(&SILENCE, t0 + i * step);
            assert_eq!(outcome, BlockOutcome::Warming);
        }

        let outcome = h.engine.process_block_at(&SPIKE, t0 + 11 * step);
        assert_eq!(outcome, BlockOutcome::Notified(AlertKind::Normal));

        let delivered = h.delivered.lock().unwrap();
        assert_eq!(delivered.as_slice(), ["Loud noise detected"]);
        assert_eq!(h.event_log.lock().unwrap().entries().count(), 1);
    }

    #[test]
    fn spike_during_warmup_never_notifies() {
        let mut h = harness(test_config());
        let t0 = Instant::now();
        let step = Duration::from_millis(500);

        for i in 0..11u32 {
            let block: &[f32] = if i == 5 { &SPIKE } else { &SILENCE };
            let outcome = h.engine.process_block_at(block, t0 + i * step);
            assert_eq!(outcome, BlockOutcome::Warming);
        }

        assert!(h.delivered.lock().unwrap().is_empty());
    }

    #[test]
    fn throttled_detection_stays_out_of_burst_history() {
        let mut h = harness(test_config());
        let t0 = Instant::now();
        let step = Duration::from_millis(500);

        for i in 0..11u32 {
            h.engine.process_block_at(&SILENCE, t0 + i * step);
        }

        let first = t0 + 11 * step;
        assert_eq!(
            h.engine.process_block_at(&SPIKE, first),
            BlockOutcome::Notified(AlertKind::Normal)
        );

        // A second loud event 0.1s later is inside the 1s interval
        let second = first + Duration::from_millis(100);
        assert_eq!(
            h.engine.process_block_at(&SPIKE, second),
            BlockOutcome::Throttled
        );

        assert_eq!(h.delivered.lock().unwrap().len(), 1);
        assert_eq!(h.engine.escalator.history_len(), 1);
    }

    #[test]
    fn clustered_notifications_escalate_to_burst_message() {
        let mut h = harness(test_config());
        let t0 = Instant::now();
        let step = Duration::from_millis(500);

        for i in 0..11u32 {
            h.engine.process_block_at(&SILENCE, t0 + i * step);
        }

        // Three deliverable loud events 2s apart, all inside the 60s window.
        // Silence in between keeps the baseline from absorbing the spikes.
        let mut now = t0 + 11 * step;
        let mut outcomes = Vec::new();
        for _ in 0..3 {
            outcomes.push(h.engine.process_block_at(&SPIKE, now));
            now += Duration::from_secs(1);
            for _ in 0..2 {
                h.engine.process_block_at(&SILENCE, now);
                now += Duration::from_millis(500);
            }
        }

        assert_eq!(
            outcomes,
            vec![
                BlockOutcome::Notified(AlertKind::Normal),
                BlockOutcome::Notified(AlertKind::Normal),
                BlockOutcome::Notified(AlertKind::Burst),
            ]
        );

        let delivered = h.delivered.lock().unwrap();
        assert_eq!(delivered[2], "Multiple loud noises detected");
    }

    #[test]
    fn quiet_blocks_only_extend_the_chart() {
        let mut h = harness(test_config());
        let t0 = Instant::now();
        let step = Duration::from_millis(500);

        for i in 0..13u32 {
            h.engine.process_block_at(&SILENCE, t0 + i * step);
        }

        let history = h.signal_history.lock().unwrap();
        assert_eq!(history.rms().len(), 13);
        assert!(history.is_ready());
        assert!(h.delivered.lock().unwrap().is_empty());
    }
}
