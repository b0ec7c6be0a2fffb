//! Vector algebra and angle primitives shared by every geometry module.
//!
//! Vectors are `glam::DVec3`; the operations the track engine needs beyond
//! what glam offers live on [`VectorExt`].

use glam::DVec3;

use crate::errors::TrackError;

/// Global up axis
pub const UP: DVec3 = DVec3::Y;
/// Global down axis
pub const DOWN: DVec3 = DVec3::NEG_Y;
/// Global right axis, the reference for deriving plane axes
pub const RIGHT: DVec3 = DVec3::X;
/// Forward direction of a point that declares none
pub const DEFAULT_FORWARD: DVec3 = DVec3::X;

/// Handle length (per unit radius) of a cubic Bezier approximating a
/// quarter circle with minimal radial error.
pub const CIRCLE_ARC_WEIGHT: f64 = 0.551_915_024_493_510_6;

/// Vector operations used by planes, curves and section parsers.
pub trait VectorExt: Sized {
    /// `self + k * v`
    fn add_scaled(self, k: f64, v: DVec3) -> DVec3;

    /// Displacement from `self` to `v`
    fn to(self, v: DVec3) -> DVec3;

    /// Linear blend: `t = 0` gives `self`, `t = 1` gives `v`
    fn interpolate(self, v: DVec3, t: f64) -> DVec3;

    /// Unit vector in the same direction.
    ///
    /// Fails with a division-by-zero error on a zero or non-finite length;
    /// `what` names the vector in the error message.
    fn try_unit(self, what: &'static str) -> Result<DVec3, TrackError>;

    /// Rotate about `axis` by `degrees` (right-handed), Rodrigues' formula.
    fn rotate_about(self, axis: DVec3, degrees: f64) -> Result<DVec3, TrackError>;

    /// Zero every component whose magnitude is below `tolerance`
    fn clamp_small(self, tolerance: f64) -> DVec3;
}

impl VectorExt for DVec3 {
    #[inline]
    fn add_scaled(self, k: f64, v: DVec3) -> DVec3 {
        self + v * k
    }

    #[inline]
    fn to(self, v: DVec3) -> DVec3 {
        v - self
    }

    #[inline]
    fn interpolate(self, v: DVec3, t: f64) -> DVec3 {
        self + (v - self) * t
    }

    fn try_unit(self, what: &'static str) -> Result<DVec3, TrackError> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return Err(TrackError::DivisionByZero { what });
        }
        Ok(self / len)
    }

    fn rotate_about(self, axis: DVec3, degrees: f64) -> Result<DVec3, TrackError> {
        if degrees == 0.0 {
            return Ok(self);
        }
        let k = axis.try_unit("rotation axis")?;
        let (sin, cos) = degrees.to_radians().sin_cos();
        // v cosθ + (k × v) sinθ + k (k·v)(1 − cosθ)
        Ok(self * cos + k.cross(self) * sin + k * (k.dot(self) * (1.0 - cos)))
    }

    fn clamp_small(self, tolerance: f64) -> DVec3 {
        let clamp = |c: f64| if c.abs() < tolerance { 0.0 } else { c };
        DVec3::new(clamp(self.x), clamp(self.y), clamp(self.z))
    }
}

/// Sum of `vectors[i] * scalars[i]`; extra entries on either side are ignored.
pub fn scaled_sum(vectors: &[DVec3], scalars: &[f64]) -> DVec3 {
    vectors
        .iter()
        .zip(scalars)
        .fold(DVec3::ZERO, |acc, (v, k)| acc.add_scaled(*k, *v))
}

/// Wrap an angle in degrees into [0, 360)
pub fn normalize_angle(degrees: f64) -> f64 {
    let a = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Wrap a bank angle in degrees into (-180, 180]
pub fn normalize_bank(degrees: f64) -> f64 {
    let a = normalize_angle(degrees);
    if a > 180.0 { a - 360.0 } else { a }
}
