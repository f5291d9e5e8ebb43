use serde::Serialize;

use crate::clock::Micros;
use crate::coords::Vec3;

pub const HISTORY_CAPACITY: usize = 16;

/// One position report as received from the mount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSample {
    pub server_micros: Option<Micros>,
    /// Local receipt time.
    pub client_micros: Micros,
    pub position: Vec3,
    pub status: i32,
}

/// The most recent samples, kept in arrival order.
///
/// Samples are never re-sorted: if the network delivered them out of order
/// the bracketing search in [`PositionHistory::query`] sees the same order.
#[derive(Debug, Clone)]
pub struct PositionHistory {
    slots: [Option<PositionSample>; HISTORY_CAPACITY],
    /// Index of the most recently inserted sample.
    newest: usize,
    len: usize,
}

impl Default for PositionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionHistory {
    pub fn new() -> Self {
        Self {
            slots: [None; HISTORY_CAPACITY],
            newest: HISTORY_CAPACITY - 1,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn insert(&mut self, sample: PositionSample) {
        self.newest = (self.newest + 1) % HISTORY_CAPACITY;
        self.slots[self.newest] = Some(sample);
        self.len = (self.len + 1).min(HISTORY_CAPACITY);
    }

    pub fn newest(&self) -> Option<&PositionSample> {
        self.slots[self.newest].as_ref()
    }

    /// Samples from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &PositionSample> + '_ {
        (0..self.len).filter_map(move |back| {
            let idx = (self.newest + HISTORY_CAPACITY - back) % HISTORY_CAPACITY;
            self.slots[idx].as_ref()
        })
    }

    /// Position at `now - latency`, linearly interpolated between the two
    /// samples around that time and pushed back onto the unit sphere.
    ///
    /// When no pair of samples brackets the target the oldest sample is
    /// returned unmodified, whether the target is older or newer than the
    /// retained window.
    pub fn query(&self, now: Micros, latency: Micros) -> Option<Vec3> {
        let target = now.saturating_sub(latency);
        let mut samples = self.iter();
        let mut newer = samples.next()?;
        for older in samples {
            if older.client_micros <= target && target <= newer.client_micros {
                return Some(interpolate(older, newer, target));
            }
            newer = older;
        }
        Some(newer.position)
    }
}

fn interpolate(older: &PositionSample, newer: &PositionSample, target: Micros) -> Vec3 {
    if older.client_micros == newer.client_micros {
        return newer.position;
    }
    let blended = newer.position * (target - older.client_micros) as f64
        + older.position * (newer.client_micros - target) as f64;
    blended.normalized().unwrap_or(newer.position)
}
