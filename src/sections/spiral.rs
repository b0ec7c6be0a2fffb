//! Spirals: helices of varying radius and height between two oriented
//! points, split into Bezier spans of at most a quarter turn each.

use glam::DVec3;

use super::{SectionParser, SegmentBuilder};
use crate::ast::{DeclinationMode, Rotation, SpiralSpec};
use crate::errors::{FieldPath, TrackError};
use crate::geom::{ControlPoint, Cylindrical, HelixFrame, PARALLEL_TOLERANCE, Plane};
use crate::log::{debug, warn};
use crate::types::{CIRCLE_ARC_WEIGHT, UP, VectorExt};

/// Largest sweep covered by a single Bezier span
const ARC_DEGREES: f64 = 90.0;

/// Most Bezier spans a single spiral may expand into (256 full turns)
pub const MAX_SPIRAL_ARCS: usize = 1024;

/// Tolerance zeroing noise in the entry/exit plane intersection
const INTERSECTION_CLAMP: f64 = 1e-9;

/// How the forward direction of generated spiral points is estimated.
///
/// None of these is exact for a helix whose radius changes; they agree on
/// constant-radius arcs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeclinationStrategy {
    /// Derivative of the interpolated cylindrical coordinates
    Analytic,
    /// Tangential direction plus climb per unit of arc length
    Heuristic,
    /// Fixed climb angle in degrees (`altDeclination`)
    Fixed(f64),
}

impl DeclinationStrategy {
    /// `altDeclination` wins, then an explicit `declination`; otherwise
    /// analytic up to one full turn and heuristic beyond.
    pub fn select(mode: Option<DeclinationMode>, alt_declination: Option<f64>, sweep: f64) -> Self {
        match (alt_declination, mode) {
            (Some(degrees), _) => DeclinationStrategy::Fixed(degrees),
            (None, Some(DeclinationMode::Analytic)) => DeclinationStrategy::Analytic,
            (None, Some(DeclinationMode::Heuristic)) => DeclinationStrategy::Heuristic,
            (None, None) if sweep <= 360.0 => DeclinationStrategy::Analytic,
            (None, None) => DeclinationStrategy::Heuristic,
        }
    }

    /// Unit forward at `frame` on the helix running from `entry` to `exit`
    /// (exit angle already unwrapped).
    pub fn forward(
        self,
        frame: &HelixFrame,
        entry: &Cylindrical,
        exit: &Cylindrical,
    ) -> Result<DVec3, TrackError> {
        let dtheta = (exit.angle() - entry.angle()).to_radians();
        let dr = exit.radius() - entry.radius();
        let dh = exit.height() - entry.height();
        let direction = match self {
            DeclinationStrategy::Analytic => {
                frame.radial * dr
                    + frame.tangential * (frame.cylindrical.radius() * dtheta)
                    + frame.normal * dh
            }
            DeclinationStrategy::Heuristic => {
                let mean_radius = (entry.radius() + exit.radius()) / 2.0;
                frame.tangential * dtheta.signum()
                    + frame.normal * (dh / (mean_radius * dtheta.abs()))
            }
            DeclinationStrategy::Fixed(degrees) => {
                let (sin, cos) = degrees.to_radians().sin_cos();
                frame.tangential * (dtheta.signum() * cos) + frame.normal * sin
            }
        };
        direction.try_unit("spiral tangent")
    }
}

/// Exit angle unwrapped so that moving from `start` reaches it in the
/// rotation's direction, plus `turns` whole extra turns.
pub fn unwrap_sweep(rotate: Rotation, start: f64, end: f64, turns: u32) -> f64 {
    let extra = turns as f64 * 360.0;
    match rotate {
        Rotation::Right => {
            let end = if start < end { end - 360.0 } else { end };
            end - extra
        }
        Rotation::Left | Rotation::Up => {
            let end = if start > end { end + 360.0 } else { end };
            end + extra
        }
    }
}

/// Bezier handle length for an arc of `arc_degrees` at `radius`; exactly
/// `radius * CIRCLE_ARC_WEIGHT` for a quarter turn.
pub fn arc_weight(radius: f64, arc_degrees: f64) -> f64 {
    let scale = (arc_degrees / 4.0).to_radians().tan() / 22.5_f64.to_radians().tan();
    radius * CIRCLE_ARC_WEIGHT * scale
}

/// Whether `to` sits (nearly) straight above or below `from`; coincident
/// points count as vertical.
fn is_vertical(from: DVec3, to: DVec3) -> bool {
    match from.to(to).try_unit("vertical offset") {
        Ok(direction) => direction.dot(UP).abs() >= PARALLEL_TOLERANCE,
        Err(_) => true,
    }
}

/// Plane whose origin is the rotation center and whose normal is the
/// rotation axis of a spiral from `entry` to `exit`.
pub fn rotation_plane(
    entry: &ControlPoint,
    exit: &ControlPoint,
    center: Option<DVec3>,
    path: &FieldPath,
) -> Result<Plane, TrackError> {
    let entry_plane = Plane::new(entry.center, entry.forward)?;
    let exit_plane = Plane::new(exit.center, exit.forward)?;

    if entry_plane.is_same(&exit_plane, PARALLEL_TOLERANCE) {
        let origin = match center {
            Some(center) => {
                if is_vertical(entry.center, center) || is_vertical(exit.center, center) {
                    return Err(TrackError::degenerate(
                        &path.field("center"),
                        "rotation center lies directly above or below the entry or exit point",
                    ));
                }
                center
            }
            None => {
                if is_vertical(entry.center, exit.center) {
                    return Err(TrackError::degenerate(
                        &path.field("endsAt"),
                        "entry and exit are vertically aligned; give the spiral a `center`",
                    ));
                }
                entry.center.interpolate(exit.center, 0.5)
            }
        };
        return Plane::new(origin, UP);
    }

    if entry_plane.is_parallel(&exit_plane, PARALLEL_TOLERANCE) {
        return Err(TrackError::not_implemented(
            path,
            "spiral between parallel but distinct entry and exit planes",
        ));
    }
    if center.is_some() {
        return Err(TrackError::range(
            &path.field("center"),
            "`center` only applies when entry and exit lie in the same plane",
        ));
    }

    let line = entry_plane.intersection(&exit_plane, Some(INTERSECTION_CLAMP));
    if line.is_degenerate() {
        return Err(TrackError::degenerate(path, "entry and exit planes do not intersect"));
    }
    let axis = if line.direction.dot(UP) < 0.0 {
        -line.direction
    } else {
        line.direction
    };
    Plane::new(line.origin, axis)
}

impl SectionParser for SpiralSpec {
    fn parse_into(&self, segment: &mut SegmentBuilder) -> Result<(), TrackError> {
        self.build(segment).map_err(|err| err.at(&self.path))
    }
}

impl SpiralSpec {
    fn build(&self, segment: &mut SegmentBuilder) -> Result<(), TrackError> {
        if self.rotate == Rotation::Up {
            return Err(TrackError::not_implemented(
                &self.path.field("rotate"),
                "spiral rotation \"up\"",
            ));
        }
        let bank = self
            .bank
            .as_ref()
            .unwrap_or(&self.settings.track_bank)
            .scaled(self.rotate.bank_sign());

        let entry = match &self.starts_at {
            Some(starts_at) => starts_at.control_point(),
            None => segment.previous(&self.path)?.clone(),
        };
        let mut exit = self.ends_at.control_point();

        let plane = rotation_plane(&entry, &exit, self.center, &self.path)?;
        let start = plane.cylindrical(entry.center)?;
        let end = plane.cylindrical(exit.center)?;
        let end = end.with_angle(unwrap_sweep(self.rotate, start.angle(), end.angle(), self.turns));

        let sweep = (end.angle() - start.angle()).abs();
        if sweep == 0.0 {
            return Err(TrackError::degenerate(
                &self.path,
                "entry and exit are at the same angle; add `turns` for a full loop",
            ));
        }
        if start.radius() == 0.0 || end.radius() == 0.0 {
            return Err(TrackError::degenerate(
                &self.path,
                "entry or exit lies on the rotation axis",
            ));
        }

        let arcs = ((sweep / ARC_DEGREES) - 1e-9).ceil().max(1.0);
        if arcs > MAX_SPIRAL_ARCS as f64 {
            warn!(path = %self.path, arcs, "spiral span limit reached");
            return Err(TrackError::ArcLimit {
                path: self.path.to_string(),
                arcs,
                max_arcs: MAX_SPIRAL_ARCS,
            });
        }
        let arcs = arcs as usize;
        let weight = arc_weight(1.0, sweep / arcs as f64);
        let strategy = DeclinationStrategy::select(self.declination, self.alt_declination, sweep);
        debug!(path = %self.path, sweep, arcs, ?strategy, "spiral");

        // Entry and exit take the spiral's bank unless they declared their own
        let enter = |point: &mut ControlPoint| {
            point.forward_weight = start.radius() * weight;
            if !point.explicit_bank {
                point.track_bank = bank.resolved_at(0.0);
            }
        };
        if self.starts_at.is_some() {
            let mut entry = entry;
            enter(&mut entry);
            segment.push(entry);
        } else if let Some(previous) = segment.last_mut() {
            enter(previous);
        }

        for i in 1..arcs {
            let t = i as f64 / arcs as f64;
            let at = start.interpolate(&end, t);
            let helix = plane.helix_at(at, |frame| strategy.forward(frame, &start, &end))?;
            let handle = at.radius() * weight;
            segment.push(ControlPoint {
                center: helix.position,
                forward: helix.forward,
                forward_weight: handle,
                backward_weight: handle,
                track_width: self.settings.track_width,
                wall_height: self.settings.wall_height,
                track_bank: bank.resolved_at(t),
                explicit_bank: false,
                median_width: self.median_width,
            });
        }

        exit.backward_weight = end.radius() * weight;
        if !exit.explicit_bank {
            exit.track_bank = bank.resolved_at(1.0);
        }
        segment.push(exit);
        Ok(())
    }
}
