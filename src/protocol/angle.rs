use std::f64::consts::PI;
use std::fmt;

use crate::coords::Vec3;

/// Size of one fixed-point angle step, `2π / 2^32` radians.
pub const QUANTUM_RAD: f64 = PI / 2_147_483_648.0;

const UNITS_PER_RAD: f64 = 2_147_483_648.0 / PI;
const HALF_TURN: i64 = 1 << 31;
const QUARTER_TURN: i64 = 1 << 30;

fn to_units(angle: f64) -> i64 {
    (0.5 + angle * UNITS_PER_RAD).floor() as i64
}

/// Right ascension as a full-turn `u32`; negative angles wrap around.
pub fn encode_ra(ra: f64) -> u32 {
    to_units(ra) as u32
}

pub fn encode_dec(dec: f64) -> i32 {
    to_units(dec) as i32
}

pub fn decode_ra(ra: u32) -> f64 {
    ra as f64 * QUANTUM_RAD
}

pub fn decode_dec(dec: i32) -> f64 {
    dec as f64 * QUANTUM_RAD
}

/// Brings a declination beyond a pole back into `[-π/2, π/2]` by mirroring
/// it across the pole and turning the right ascension by half a turn.
/// Both pairs name the same direction.
pub fn fold_pole(ra: u32, dec: i32) -> (u32, i32) {
    let d = dec as i64;
    if d > QUARTER_TURN {
        (ra.wrapping_add(HALF_TURN as u32), (HALF_TURN - d) as i32)
    } else if d < -QUARTER_TURN {
        (ra.wrapping_add(HALF_TURN as u32), (-HALF_TURN - d) as i32)
    } else {
        (ra, dec)
    }
}

pub fn encode_ra_dec(ra: f64, dec: f64) -> (u32, i32) {
    fold_pole(encode_ra(ra), encode_dec(dec))
}

/// Inverse of [`encode_ra_dec`]; the result has `ra ∈ [0, 2π)`, `dec ∈ [-π/2, π/2]`.
pub fn decode_ra_dec(ra: u32, dec: i32) -> (f64, f64) {
    let (ra, dec) = fold_pole(ra, dec);
    (decode_ra(ra), decode_dec(dec))
}

pub fn encode_direction(direction: &Vec3) -> (u32, i32) {
    let (ra, dec) = direction.to_ra_dec();
    encode_ra_dec(ra, dec)
}

pub fn decode_direction(ra: u32, dec: i32) -> Vec3 {
    let (ra, dec) = decode_ra_dec(ra, dec);
    Vec3::from_ra_dec(ra, dec)
}

/// Human readable fixed-point position, e.g. `ra = 12h30m00.0000 dec = +45d00m00.000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaDec {
    pub ra: u32,
    pub dec: i32,
}

impl RaDec {
    pub fn new(ra: u32, dec: i32) -> Self {
        Self { ra, dec }
    }

    pub fn from_direction(direction: &Vec3) -> Self {
        let (ra, dec) = encode_direction(direction);
        Self { ra, dec }
    }
}

impl fmt::Display for RaDec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAS_PER_UNIT: f64 = 360.0 * 3600.0 * 1000.0 / 4_294_967_296.0;
        const RA_TICKS_PER_UNIT: f64 = 24.0 * 3600.0 * 10000.0 / 4_294_967_296.0;
        const QUARTER_MAS: i64 = 90 * 3600 * 1000;
        const HALF_MAS: i64 = 180 * 3600 * 1000;

        let mut ra = self.ra;
        let mut d = (0.5 + self.dec as f64 * MAS_PER_UNIT).floor() as i64;
        let sign = if d >= 0 {
            if d > QUARTER_MAS {
                d = HALF_MAS - d;
                ra = ra.wrapping_add(0x8000_0000);
            }
            '+'
        } else {
            if d < -QUARTER_MAS {
                d = -HALF_MAS - d;
                ra = ra.wrapping_add(0x8000_0000);
            }
            d = -d;
            '-'
        };

        // ra in units of 1/10000 s of time
        let mut h = (0.5 + ra as f64 * RA_TICKS_PER_UNIT).floor() as u64;
        let ra_ticks = h % 10000;
        h /= 10000;
        let ra_s = h % 60;
        h /= 60;
        let ra_m = h % 60;
        h /= 60;
        h %= 24;

        let dec_ms = d % 1000;
        d /= 1000;
        let dec_s = d % 60;
        d /= 60;
        let dec_m = d % 60;
        d /= 60;

        write!(
            f,
            "ra = {h:>2}h{ra_m:02}m{ra_s:02}.{ra_ticks:04} dec = {pad}{sign}{d}d{dec_m:02}m{dec_s:02}.{dec_ms:03}",
            pad = if d < 10 { " " } else { "" },
        )
    }
}
