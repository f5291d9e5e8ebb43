use serde::Serialize;
use std::ops::{Add, Mul};

/// Cartesian direction in the J2000 equatorial frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Unit vector pointing at the given right ascension / declination (radians).
    pub fn from_ra_dec(ra: f64, dec: f64) -> Self {
        let cos_dec = dec.cos();
        Self::new(ra.cos() * cos_dec, ra.sin() * cos_dec, dec.sin())
    }

    /// Right ascension in `(-π, π]` and declination in `[-π/2, π/2]`.
    pub fn to_ra_dec(&self) -> (f64, f64) {
        let ra = self.y.atan2(self.x);
        let dec = self.z.atan2(self.x.hypot(self.y));
        (ra, dec)
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// `None` for the zero vector (and anything non-finite).
    pub fn normalized(&self) -> Option<Self> {
        let lq = self.length_squared();
        if lq > 0.0 && lq.is_finite() {
            Some(*self * (1.0 / lq.sqrt()))
        } else {
            None
        }
    }

    pub fn distance(&self, other: &Vec3) -> f64 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z).length()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn ra_dec_round_trip() {
        let v = Vec3::from_ra_dec(1.2, -0.3);
        let (ra, dec) = v.to_ra_dec();
        assert!((ra - 1.2).abs() < 1e-12);
        assert!((dec + 0.3).abs() < 1e-12);
        assert!((v.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pole_has_zero_ra() {
        let (ra, dec) = Vec3::new(0.0, 0.0, 1.0).to_ra_dec();
        assert_eq!(ra, 0.0);
        assert!((dec - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn normalizing_zero_gives_none() {
        assert!(Vec3::ZERO.normalized().is_none());
        let n = Vec3::new(1.0, 1.0, 0.0).normalized().unwrap();
        assert!((n.x - FRAC_PI_4.cos()).abs() < 1e-12);
    }
}
