use std::collections::VecDeque;
use std::time::Duration;

/// Bounded rms/ema series for the chart.
///
/// One lock per logical value: the audio callback appends, the GUI clones a
/// snapshot on its own repaint cadence and never mutates.
#[derive(Clone)]
pub struct SignalHistory {
    capacity: usize,
    rms: VecDeque<f32>,
    ema: VecDeque<f32>,
    ready: bool,
}

impl SignalHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rms: VecDeque::with_capacity(capacity),
            ema: VecDeque::with_capacity(capacity),
            ready: false,
        }
    }

    /// Append one block's measurements, dropping the oldest past capacity.
    pub fn push(&mut self, rms: f32, ema: f32, ready: bool) {
        self.rms.push_back(rms);
        self.ema.push_back(ema);
        while self.rms.len() > self.capacity {
            self.rms.pop_front();
        }
        while self.ema.len() > self.capacity {
            self.ema.pop_front();
        }
        self.ready = ready;
    }

    pub fn rms(&self) -> &VecDeque<f32> {
        &self.rms
    }

    pub fn ema(&self) -> &VecDeque<f32> {
        &self.ema
    }

    pub fn latest(&self) -> Option<(f32, f32)> {
        Some((*self.rms.back()?, *self.ema.back()?))
    }

    /// Whether the baseline was warmed up as of the latest block.
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

#[derive(Clone)]
pub struct LogEntry {
    pub elapsed: Duration,
    pub message: String,
}

impl LogEntry {
    /// `[HH:MM:SS] message`, relative to engine start.
    pub fn display_line(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!(
            "[{:02}:{:02}:{:02}] {}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60,
            self.message
        )
    }
}

/// Bounded, most-recent-first log of delivered alerts.
#[derive(Clone)]
pub struct EventLog {
    limit: usize,
    entries: VecDeque<LogEntry>,
}

impl EventLog {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: VecDeque::with_capacity(limit),
        }
    }

    pub fn push(&mut self, elapsed: Duration, message: impl Into<String>) {
        self.entries.push_front(LogEntry {
            elapsed,
            message: message.into(),
        });
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
