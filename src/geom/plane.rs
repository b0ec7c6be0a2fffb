//! Oriented planes: local axes, cylindrical coordinates, helix
//! reconstruction and plane/plane intersection.

use std::cell::OnceCell;

use glam::DVec3;

use super::cylindrical::Cylindrical;
use crate::errors::{FieldPath, TrackError};
use crate::types::{RIGHT, VectorExt, normalize_angle};

/// Dot-product threshold above which two normals count as parallel.
///
/// This is a deliberately loose tolerance (about 18°), not a physical
/// statement about the planes; spiral plane derivation relies on it to
/// route near-parallel entry/exit pairs to the same-plane case.
pub const PARALLEL_TOLERANCE: f64 = 0.95;

/// Below this cross-product length two planes are treated as parallel
const INTERSECTION_EPSILON: f64 = 1e-4;

/// Normals this close to global right cannot derive axes from it
const AXIS_EPSILON: f64 = 1e-6;

/// A plane through `origin` with unit `normal`.
///
/// The in-plane axes are derived on first use and never recomputed.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: DVec3,
    normal: DVec3,
    axes: OnceCell<(DVec3, DVec3)>,
}

/// A line through `origin` along unit `direction`.
///
/// The degenerate line (both zero) stands for "no intersection".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Line {
    pub const DEGENERATE: Line = Line {
        origin: DVec3::ZERO,
        direction: DVec3::ZERO,
    };

    pub fn is_degenerate(&self) -> bool {
        self.direction == DVec3::ZERO
    }
}

/// Local frame of a point on a helix around a plane's normal
#[derive(Debug, Clone, Copy)]
pub struct HelixFrame {
    pub cylindrical: Cylindrical,
    pub position: DVec3,
    /// Unit vector from the axis toward the point
    pub radial: DVec3,
    /// Unit vector of increasing angle
    pub tangential: DVec3,
    pub normal: DVec3,
}

/// A reconstructed helix point and its forward direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixPoint {
    pub position: DVec3,
    pub forward: DVec3,
}

impl Plane {
    pub fn new(origin: DVec3, normal: DVec3) -> Result<Self, TrackError> {
        Ok(Self {
            origin,
            normal: normal.try_unit("plane normal")?,
            axes: OnceCell::new(),
        })
    }

    #[inline]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    #[inline]
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// In-plane (x, y) axes: x is global right projected onto the plane,
    /// y = normal × x so that angles grow right-handedly about the normal.
    pub fn axes(&self) -> Result<(DVec3, DVec3), TrackError> {
        if let Some(axes) = self.axes.get() {
            return Ok(*axes);
        }
        if self.normal.dot(RIGHT).abs() > 1.0 - AXIS_EPSILON {
            return Err(TrackError::not_implemented(
                &FieldPath::default(),
                "plane axes for a normal parallel to the global right axis",
            ));
        }
        let x = RIGHT
            .add_scaled(-RIGHT.dot(self.normal), self.normal)
            .try_unit("plane x axis")?;
        let y = self.normal.cross(x);
        Ok(*self.axes.get_or_init(|| (x, y)))
    }

    pub fn is_parallel(&self, other: &Plane, tolerance: f64) -> bool {
        self.normal.dot(other.normal).abs() >= tolerance
    }

    /// Parallel, and the other plane's origin lies in this plane (within the
    /// same loose tolerance applied to the direction between the origins).
    pub fn is_same(&self, other: &Plane, tolerance: f64) -> bool {
        if !self.is_parallel(other, tolerance) {
            return false;
        }
        match self.origin.to(other.origin).try_unit("plane offset") {
            Ok(offset) => offset.dot(self.normal).abs() <= 1.0 - tolerance,
            // Coincident origins
            Err(_) => true,
        }
    }

    /// (radius, angle ∈ [0, 360), height) of `point` relative to this plane.
    pub fn cylindrical(&self, point: DVec3) -> Result<Cylindrical, TrackError> {
        let (x, y) = self.axes()?;
        let offset = self.origin.to(point);
        let height = offset.dot(self.normal);
        let radial = offset.add_scaled(-height, self.normal);
        let angle = radial.dot(y).atan2(radial.dot(x)).to_degrees();
        Ok(Cylindrical::new(
            radial.length(),
            normalize_angle(angle),
            height,
        ))
    }

    /// Inverse of [`Plane::cylindrical`]: rebuild the 3-D point and ask
    /// `forward` for its direction given the local helix frame.
    pub fn helix_at<F>(&self, at: Cylindrical, forward: F) -> Result<HelixPoint, TrackError>
    where
        F: FnOnce(&HelixFrame) -> Result<DVec3, TrackError>,
    {
        let (x, y) = self.axes()?;
        let (sin, cos) = at.angle().to_radians().sin_cos();
        let radial = x * cos + y * sin;
        let tangential = y * cos - x * sin;
        let position = self
            .origin
            .add_scaled(at.radius(), radial)
            .add_scaled(at.height(), self.normal);
        let frame = HelixFrame {
            cylindrical: at,
            position,
            radial,
            tangential,
            normal: self.normal,
        };
        Ok(HelixPoint {
            position,
            forward: forward(&frame)?,
        })
    }

    /// Line where this plane meets `other`.
    ///
    /// Nearly parallel planes yield [`Line::DEGENERATE`] instead of an error;
    /// callers must check [`Line::is_degenerate`]. `clamp` zeroes tiny
    /// components of the result.
    pub fn intersection(&self, other: &Plane, clamp: Option<f64>) -> Line {
        let direction = self.normal.cross(other.normal);
        let denom = direction.length_squared();
        if denom.sqrt() < INTERSECTION_EPSILON {
            return Line::DEGENERATE;
        }
        let d1 = self.normal.dot(self.origin);
        let d2 = other.normal.dot(other.origin);
        // Point on the line closest to the global origin
        let origin = (other.normal.cross(direction) * d1 + direction.cross(self.normal) * d2) / denom;
        let direction = direction / denom.sqrt();
        match clamp {
            Some(tolerance) => Line {
                origin: origin.clamp_small(tolerance),
                direction: direction
                    .clamp_small(tolerance)
                    .try_unit("intersection direction")
                    .unwrap_or(direction),
            },
            None => Line { origin, direction },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UP;
    use glam::dvec3;

    fn close(a: DVec3, b: DVec3) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn axes_are_orthonormal_and_right_handed() {
        let plane = Plane::new(DVec3::ZERO, dvec3(0.0, 2.0, 0.0)).unwrap();
        let (x, y) = plane.axes().unwrap();
        assert!(close(x, DVec3::X));
        assert!(close(y, DVec3::NEG_Z));
        assert!(close(x.cross(y), plane.normal()));
    }

    #[test]
    fn axes_refuse_normal_along_global_right() {
        let plane = Plane::new(DVec3::ZERO, DVec3::NEG_X).unwrap();
        let err = plane.axes().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotImplemented);
    }

    #[test]
    fn zero_normal_rejected() {
        assert!(Plane::new(DVec3::ZERO, DVec3::ZERO).is_err());
    }

    #[test]
    fn cylindrical_round_trips_through_helix_at() {
        let plane = Plane::new(dvec3(1.0, 2.0, 3.0), dvec3(0.2, 1.0, -0.1)).unwrap();
        let point = dvec3(7.0, -4.0, 5.5);
        let cyl = plane.cylindrical(point).unwrap();
        assert!((0.0..360.0).contains(&cyl.angle()));
        let rebuilt = plane.helix_at(cyl, |f| Ok(f.tangential)).unwrap();
        assert!(close(rebuilt.position, point));
        assert!((rebuilt.forward.dot(plane.normal())).abs() < 1e-12);
    }

    #[test]
    fn cylindrical_angle_grows_turning_left_about_up() {
        let plane = Plane::new(DVec3::ZERO, UP).unwrap();
        let a = plane.cylindrical(dvec3(5.0, 1.0, 0.0)).unwrap();
        let b = plane.cylindrical(dvec3(0.0, 3.0, -5.0)).unwrap();
        assert!(a.angle().abs() < 1e-12);
        assert!((b.angle() - 90.0).abs() < 1e-12);
        assert_eq!(a.height(), 1.0);
        assert_eq!(b.height(), 3.0);
        assert!((b.radius() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn parallel_and_same() {
        let a = Plane::new(DVec3::ZERO, DVec3::X).unwrap();
        let b = Plane::new(dvec3(0.0, 4.0, -20.0), DVec3::NEG_X).unwrap();
        let c = Plane::new(dvec3(5.0, 0.0, 0.0), DVec3::X).unwrap();
        let d = Plane::new(DVec3::ZERO, DVec3::Z).unwrap();
        assert!(a.is_same(&b, PARALLEL_TOLERANCE));
        assert!(a.is_parallel(&c, PARALLEL_TOLERANCE));
        assert!(!a.is_same(&c, PARALLEL_TOLERANCE));
        assert!(!a.is_parallel(&d, PARALLEL_TOLERANCE));
        assert!(a.is_same(&a.clone(), PARALLEL_TOLERANCE));
    }

    #[test]
    fn intersection_of_perpendicular_planes() {
        // x = 0 and z = -10 meet in the vertical line through (0, 0, -10)
        let a = Plane::new(DVec3::ZERO, DVec3::X).unwrap();
        let b = Plane::new(dvec3(10.0, 0.0, -10.0), DVec3::NEG_Z).unwrap();
        let line = a.intersection(&b, Some(1e-9));
        assert!(!line.is_degenerate());
        assert!(close(line.origin, dvec3(0.0, 0.0, -10.0)));
        assert!(close(line.direction, DVec3::Y));
    }

    #[test]
    fn intersection_of_parallel_planes_is_degenerate() {
        let a = Plane::new(DVec3::ZERO, DVec3::X).unwrap();
        let b = Plane::new(dvec3(3.0, 0.0, 0.0), DVec3::X).unwrap();
        let line = a.intersection(&b, None);
        assert!(line.is_degenerate());
        assert_eq!(line, Line::DEGENERATE);
    }

    #[test]
    fn intersection_lies_on_both_planes() {
        let a = Plane::new(dvec3(1.0, 2.0, 3.0), dvec3(1.0, 0.3, 0.0)).unwrap();
        let b = Plane::new(dvec3(-4.0, 0.0, 9.0), dvec3(0.2, -0.1, 1.0)).unwrap();
        let line = a.intersection(&b, None);
        for s in [-3.0, 0.0, 5.0] {
            let p = line.origin.add_scaled(s, line.direction);
            assert!(a.origin().to(p).dot(a.normal()).abs() < 1e-9);
            assert!(b.origin().to(p).dot(b.normal()).abs() < 1e-9);
        }
    }
}
