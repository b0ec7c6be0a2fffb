//! Section parsers: turn validated sections into control points and the
//! curve builders that join them.
//!
//! Each variant of [`Section`](crate::ast::Section) implements
//! [`SectionParser`]; dispatch goes through `enum_dispatch`, so adding a
//! section kind means adding a variant and one impl.

mod point;
mod spiral;
mod straight;

pub use spiral::{DeclinationStrategy, arc_weight, rotation_plane, unwrap_sweep};

use enum_dispatch::enum_dispatch;

use crate::ast::{PointSpec, Section, SegmentSpec, SpiralSpec, StraightSpec};
use crate::errors::{FieldPath, TrackError};
use crate::geom::{ControlPoint, CrossSection, Curve};
use crate::log::{debug, trace};
use crate::settings::Bank;

/// Appends a section's control points to the segment being built.
#[enum_dispatch]
pub trait SectionParser {
    fn parse_into(&self, segment: &mut SegmentBuilder) -> Result<(), TrackError>;
}

impl Section {
    /// Location of the section in the input
    pub fn path(&self) -> &FieldPath {
        match self {
            Section::Point(point) => &point.path,
            Section::Straight(straight) => &straight.path,
            Section::Spiral(spiral) => &spiral.path,
        }
    }
}

/// Joins two consecutive control points with one flattened curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveBuilder {
    precision: f64,
    debug: bool,
    label: Option<String>,
    /// Slice of the starting point's bank schedule this span follows
    bank_range: (f64, f64),
}

impl CurveBuilder {
    pub fn new(precision: f64, debug: bool, label: Option<String>) -> Self {
        Self {
            precision,
            debug,
            label,
            bank_range: (0.0, 1.0),
        }
    }

    /// The Bezier span `sp0 → sp1`
    pub fn curve(&self, sp0: &ControlPoint, sp1: &ControlPoint) -> Result<Curve, TrackError> {
        Ok(Curve::new(sp0, sp1)?.with_bank_range(self.bank_range))
    }

    /// Flatten the span `sp0 → sp1` into `out`, returning the end
    /// cross-section (not appended).
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn build(
        &self,
        sp0: &ControlPoint,
        sp1: &ControlPoint,
        out: &mut Vec<CrossSection>,
    ) -> Result<CrossSection, TrackError> {
        let curve = self.curve(sp0, sp1)?;
        let before = out.len();
        let end = curve.flatten(self.precision, out)?;
        let label = self.label.as_deref().unwrap_or("");
        trace!(label, sections = out.len() - before, "flattened span");
        if self.debug {
            for section in &out[before..] {
                debug!(
                    label,
                    center = ?section.center,
                    forward = ?section.forward,
                    down = ?section.down,
                    width = section.width,
                    "cross-section"
                );
            }
        }
        Ok(end)
    }
}

/// Accumulates the control points of one segment in order.
///
/// Every point after the first gets a [`CurveBuilder`] joining it to its
/// predecessor, so `builders.len() == points.len() - 1` once non-empty.
#[derive(Debug)]
pub struct SegmentBuilder {
    path: FieldPath,
    precision: f64,
    debug: bool,
    label: Option<String>,
    points: Vec<ControlPoint>,
    builders: Vec<CurveBuilder>,
}

impl SegmentBuilder {
    pub fn new(segment: &SegmentSpec) -> Self {
        Self {
            path: segment.path.clone(),
            precision: segment.settings.precision,
            debug: segment.settings.debug,
            label: segment.settings.debug_label.clone(),
            points: Vec::new(),
            builders: Vec::new(),
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Append a point; a point without its own median width takes the
    /// previous point's.
    pub fn push(&mut self, mut point: ControlPoint) {
        if point.median_width.is_none() {
            point.median_width = self.points.last().and_then(|p| p.median_width);
        }
        self.points.push(point);
        if self.points.len() >= 2 {
            self.builders.push(CurveBuilder::new(
                self.precision,
                self.debug,
                self.label.clone(),
            ));
        }
    }

    pub fn last(&self) -> Option<&ControlPoint> {
        self.points.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut ControlPoint> {
        self.points.last_mut()
    }

    /// The previous point, required by sections that continue from it
    pub(crate) fn previous(&self, section: &FieldPath) -> Result<&ControlPoint, TrackError> {
        self.points.last().ok_or_else(|| {
            TrackError::range(section, "section needs a preceding point in its segment")
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Finished points and builders, with shared bank schedules spread
    /// over the points that share them
    pub fn into_parts(mut self) -> (Vec<ControlPoint>, Vec<CurveBuilder>) {
        self.spread_schedules();
        (self.points, self.builders)
    }

    /// A run of consecutive points carrying the same bank schedule follows
    /// it once from end to end. Span `k` of a run with `n` spans covers
    /// `[k/n, (k+1)/n]` of the schedule and the run's last point takes the
    /// schedule's final angle, so neighbouring spans agree where they meet.
    fn spread_schedules(&mut self) {
        let mut start = 0;
        while start < self.points.len() {
            let bank = &self.points[start].track_bank;
            let mut end = start + 1;
            if matches!(bank, Bank::Schedule(_)) {
                while end < self.points.len() && self.points[end].track_bank == *bank {
                    end += 1;
                }
            }
            let spans = end - start - 1;
            if spans > 0 {
                for k in 0..spans {
                    self.builders[start + k].bank_range =
                        (k as f64 / spans as f64, (k + 1) as f64 / spans as f64);
                }
                let last = &mut self.points[end - 1];
                last.track_bank = last.track_bank.resolved_at(1.0);
            }
            start = end;
        }
    }
}
