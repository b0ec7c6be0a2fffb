//! Cylindrical coordinates relative to a plane's origin, axes and normal.

/// An immutable (radius, angle, height) triple.
///
/// `angle` is in degrees. Values produced by [`super::Plane::cylindrical`]
/// lie in [0, 360); interpolated or unwrapped angles may leave that range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylindrical {
    radius: f64,
    angle: f64,
    height: f64,
}

impl Cylindrical {
    pub const fn new(radius: f64, angle: f64, height: f64) -> Self {
        Self {
            radius,
            angle,
            height,
        }
    }

    #[inline]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    #[inline]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Component-wise linear blend toward `other`
    pub fn interpolate(&self, other: &Cylindrical, t: f64) -> Cylindrical {
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        Cylindrical {
            radius: lerp(self.radius, other.radius),
            angle: lerp(self.angle, other.angle),
            height: lerp(self.height, other.height),
        }
    }

    /// Same radius and height, different angle
    pub fn with_angle(&self, angle: f64) -> Cylindrical {
        Cylindrical { angle, ..*self }
    }
}
