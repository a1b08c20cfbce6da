/// Warm-up state of the moving average. Transitions are strictly forward:
/// Seeding → Warming → Ready, once each, for the lifetime of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warmup {
    /// No sample seen yet; the next sample seeds the baseline directly.
    Seeding,
    /// Baseline is updating but not yet trusted for detection.
    Warming { remaining: u32 },
    /// Baseline is trusted. Never leaves this state.
    Ready,
}

/// Exponential moving average of block loudness, gated by a warm-up countdown.
///
/// The countdown is `ceil(1/alpha)` blocks, the rule-of-thumb e-folding count
/// for the EMA's settling time. Without it, a baseline seeded from an atypical
/// first block could produce spurious detections before the average stabilizes.
pub struct BaselineTracker {
    alpha: f32,
    warmup_blocks: u32,
    baseline: f32,
    warmup: Warmup,
}

impl BaselineTracker {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            warmup_blocks: (1.0 / alpha).ceil() as u32,
            baseline: 0.0,
            warmup: Warmup::Seeding,
        }
    }

    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    pub fn warmup(&self) -> Warmup {
        self.warmup
    }

    /// Feed one loudness sample. Returns the updated baseline and whether it
    /// is warmed up enough to be trusted for detection.
    ///
    /// The EMA keeps updating during warm-up; only its use is gated. The call
    /// that exhausts the countdown still reports not-ready, so detection first
    /// runs on the following block.
    pub fn update(&mut self, loudness: f32) -> (f32, bool) {
        match self.warmup {
            Warmup::Seeding => {
                self.baseline = loudness;
                self.warmup = Warmup::Warming {
                    remaining: self.warmup_blocks,
                };
                (self.baseline, false)
            }
            Warmup::Warming { remaining } => {
                self.baseline = self.baseline * (1.0 - self.alpha) + loudness * self.alpha;
                let remaining = remaining - 1;
                self.warmup = if remaining == 0 {
                    Warmup::Ready
                } else {
                    Warmup::Warming { remaining }
                };
                (self.baseline, false)
            }
            Warmup::Ready => {
                self.baseline = self.baseline * (1.0 - self.alpha) + loudness * self.alpha;
                (self.baseline, true)
            }
        }
    }
}
