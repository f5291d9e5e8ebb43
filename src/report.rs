use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::clock::Micros;
use crate::protocol::RaDec;
use crate::telescope::Telescope;

/// Snapshot of one telescope for the `watch` output.
#[derive(Debug, Clone, Serialize)]
pub struct TelescopeReport {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub connected: bool,
    pub ra_deg: Option<f64>,
    pub dec_deg: Option<f64>,
    #[serde(skip)]
    pub fixed_point: Option<RaDec>,
}

impl TelescopeReport {
    pub fn capture<T: Telescope + ?Sized>(telescope: &T, now: Micros) -> Self {
        let position = telescope.current_position(now);
        let ra_dec = position.map(|p| p.to_ra_dec());
        Self {
            name: telescope.name().to_string(),
            timestamp: DateTime::from_timestamp_micros(now).unwrap_or_default(),
            connected: telescope.is_connected(),
            ra_deg: ra_dec.map(|(ra, _)| ra.to_degrees().rem_euclid(360.0)),
            dec_deg: ra_dec.map(|(_, dec)| dec.to_degrees()),
            fixed_point: position.map(|p| RaDec::from_direction(&p)),
        }
    }
}

impl fmt::Display for TelescopeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.connected {
            "connected"
        } else {
            "disconnected"
        };
        match &self.fixed_point {
            Some(ra_dec) => write!(f, "{} ({}): {}", self.name, state, ra_dec),
            None => write!(f, "{} ({}): position unknown", self.name, state),
        }
    }
}
