use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Microseconds since the unix epoch.
pub type Micros = i64;

pub const MICROS_PER_SECOND: Micros = 1_000_000;

/// Source of the timestamps stamped on received samples and outgoing commands.
pub trait Clock {
    fn now_micros(&self) -> Micros;
}

/// Wall-clock aligned, but monotonic: the epoch offset is sampled once and
/// advanced by `Instant` afterwards, so system clock steps never move it back.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch_micros: Micros,
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch_micros: chrono::Utc::now().timestamp_micros(),
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_micros(&self) -> Micros {
        let elapsed = i64::try_from(self.origin.elapsed().as_micros()).unwrap_or(i64::MAX);
        self.epoch_micros.saturating_add(elapsed)
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn starting_at(now: Micros) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    pub fn set(&self, now: Micros) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Micros) {
        self.now.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> Micros {
        self.now.load(Ordering::SeqCst)
    }
}
