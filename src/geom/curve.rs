//! Cubic Bezier spans between control points and their adaptive
//! flattening into cross-sections.

use glam::DVec3;

use super::ribbon::CrossSection;
use crate::errors::TrackError;
use crate::log::warn;
use crate::settings::Bank;
use crate::types::{DOWN, VectorExt, scaled_sum};

/// Recursion cap for adaptive subdivision (at most 2^18 sections per span)
pub const MAX_SUBDIVISION_DEPTH: usize = 18;

/// Median width used until some point declares one
pub const DEFAULT_MEDIAN_WIDTH: f64 = 1.0;

/// An oriented point on the track with everything a span needs from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    pub center: DVec3,
    /// Unit length
    pub forward: DVec3,
    /// Handle length leaving this point
    pub forward_weight: f64,
    /// Handle length arriving at this point
    pub backward_weight: f64,
    pub track_width: f64,
    pub wall_height: f64,
    pub track_bank: Bank,
    /// `track_bank` was declared by the point's own section, not inherited
    pub explicit_bank: bool,
    pub median_width: Option<f64>,
}

impl ControlPoint {
    /// The cross-section sitting exactly on this point
    pub fn cross_section(&self) -> Result<CrossSection, TrackError> {
        let down = match &self.track_bank {
            Bank::Vector(v) => orthogonal_down(*v, self.forward)?,
            bank => banked_down(self.forward, bank.angle_at(0.0).unwrap_or(0.0))?,
        };
        Ok(CrossSection {
            center: self.center,
            forward: self.forward,
            down,
            width: self.track_width,
            wall_height: self.wall_height,
            median_width: self.median_width.unwrap_or(DEFAULT_MEDIAN_WIDTH),
        })
    }
}

/// Global down with the forward component removed, rotated about forward
/// by `angle` degrees. Positive angles lower the left edge.
pub fn banked_down(forward: DVec3, angle: f64) -> Result<DVec3, TrackError> {
    let level = orthogonal_down(DOWN, forward)?;
    level.rotate_about(-forward, angle)
}

/// `down` made perpendicular to `forward` and normalized
fn orthogonal_down(down: DVec3, forward: DVec3) -> Result<DVec3, TrackError> {
    down.add_scaled(-down.dot(forward), forward)
        .try_unit("down vector")
}

/// How banking varies across one span
#[derive(Debug, Clone, PartialEq)]
enum BankProfile {
    /// Angle schedule carried by the starting point, over the slice of
    /// the schedule this span covers
    Schedule(Bank, (f64, f64)),
    /// Endpoint down vectors, blended then re-orthogonalized
    Directions(DVec3, DVec3),
}

/// One cubic Bezier span between two control points.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    points: [DVec3; 4],
    width: (f64, f64),
    wall_height: (f64, f64),
    median_width: (f64, f64),
    bank: BankProfile,
}

impl Curve {
    pub fn new(sp0: &ControlPoint, sp1: &ControlPoint) -> Result<Self, TrackError> {
        let points = [
            sp0.center,
            sp0.center.add_scaled(sp0.forward_weight, sp0.forward),
            sp1.center.add_scaled(-sp1.backward_weight, sp1.forward),
            sp1.center,
        ];
        let bank = match &sp0.track_bank {
            schedule @ Bank::Schedule(_) => BankProfile::Schedule(schedule.clone(), (0.0, 1.0)),
            _ => BankProfile::Directions(
                sp0.cross_section()?.down,
                sp1.cross_section()?.down,
            ),
        };
        let median = |p: &ControlPoint| p.median_width.unwrap_or(DEFAULT_MEDIAN_WIDTH);
        Ok(Self {
            points,
            width: (sp0.track_width, sp1.track_width),
            wall_height: (sp0.wall_height, sp1.wall_height),
            median_width: (median(sp0), median(sp1)),
            bank,
        })
    }

    /// Follow only `range` of sp0's bank schedule instead of all of it, for
    /// a span that is one of several sharing the schedule. No effect on
    /// other banks.
    pub fn with_bank_range(mut self, range: (f64, f64)) -> Self {
        if let BankProfile::Schedule(_, slice) = &mut self.bank {
            *slice = range;
        }
        self
    }

    /// The four Bezier control points
    pub fn control_points(&self) -> &[DVec3; 4] {
        &self.points
    }

    /// Point on the curve; exact at `t = 0` and `t = 1`
    pub fn position(&self, t: f64) -> DVec3 {
        let mt = 1.0 - t;
        scaled_sum(
            &self.points,
            &[mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t],
        )
    }

    /// Unit tangent
    pub fn forward(&self, t: f64) -> Result<DVec3, TrackError> {
        let [p0, p1, p2, p3] = self.points;
        let mt = 1.0 - t;
        scaled_sum(
            &[p0.to(p1), p1.to(p2), p2.to(p3)],
            &[mt * mt, 2.0 * mt * t, t * t],
        )
        .try_unit("curve tangent")
    }

    fn down(&self, t: f64, forward: DVec3) -> Result<DVec3, TrackError> {
        match &self.bank {
            BankProfile::Schedule(bank, (t0, t1)) => {
                let at = t0 + (t1 - t0) * t;
                banked_down(forward, bank.angle_at(at).unwrap_or(0.0))
            }
            BankProfile::Directions(d0, d1) => orthogonal_down(d0.interpolate(*d1, t), forward),
        }
    }

    /// Full cross-section at `t`
    pub fn sample(&self, t: f64) -> Result<CrossSection, TrackError> {
        let lerp = |(a, b): (f64, f64)| a + (b - a) * t;
        let forward = self.forward(t)?;
        Ok(CrossSection {
            center: self.position(t),
            forward,
            down: self.down(t, forward)?,
            width: lerp(self.width),
            wall_height: lerp(self.wall_height),
            median_width: lerp(self.median_width),
        })
    }

    /// Append cross-sections for [0, 1) to `out` until every chord is within
    /// `precision` of the curve, and return the sample at `t = 1`.
    ///
    /// The end sample is left to the caller so adjacent spans share exactly
    /// one boundary section.
    pub fn flatten(
        &self,
        precision: f64,
        out: &mut Vec<CrossSection>,
    ) -> Result<CrossSection, TrackError> {
        let start = self.sample(0.0)?;
        let end = self.sample(1.0)?;
        self.subdivide((0.0, &start), (1.0, &end), precision, 0, out)?;
        Ok(end)
    }

    fn subdivide(
        &self,
        (t0, s0): (f64, &CrossSection),
        (t1, s1): (f64, &CrossSection),
        precision: f64,
        depth: usize,
        out: &mut Vec<CrossSection>,
    ) -> Result<(), TrackError> {
        let tm = (t0 + t1) / 2.0;
        let mid = self.sample(tm)?;
        // Only the midpoint is tested, so a span whose deviation cancels
        // there (a symmetric S between parallel forwards) passes as one chord.
        let chord_mid = s0.center.interpolate(s1.center, 0.5);
        if mid.center.distance(chord_mid) <= precision {
            out.push(*s0);
            return Ok(());
        }
        if depth >= MAX_SUBDIVISION_DEPTH {
            warn!(t0, t1, precision, "curve subdivision limit reached");
            return Err(TrackError::SubdivisionLimit {
                max_depth: MAX_SUBDIVISION_DEPTH,
                precision,
            });
        }
        self.subdivide((t0, s0), (tm, &mid), precision, depth + 1, out)?;
        self.subdivide((tm, &mid), (t1, s1), precision, depth + 1, out)
    }
}
