//! Validated track definition.
//!
//! These types are what [`crate::parse`] produces from raw input: every
//! shape, type and range rule has already been checked, every setting has
//! been inherited down to the section that uses it, and every forward
//! vector is unit length. Geometry code never sees raw JSON.

use enum_dispatch::enum_dispatch;
use glam::DVec3;

use crate::errors::{FieldPath, TrackError};
use crate::sections::{SectionParser, SegmentBuilder};
use crate::settings::{Bank, Settings};

/// Most lanes a segment may be divided into
pub const MAX_LANES: usize = 64;

/// A complete track
#[derive(Debug, Clone)]
pub struct TrackSpec {
    pub segments: Vec<SegmentSpec>,
    /// Only ever true for a single-segment track
    pub closed: bool,
    pub settings: Settings,
}

/// One continuous run of sections
#[derive(Debug, Clone)]
pub struct SegmentSpec {
    pub path: FieldPath,
    pub settings: Settings,
    /// Number of driving lanes, at most [`MAX_LANES`]; `lanes - 1` medians
    /// divide them
    pub lanes: usize,
    pub sections: Vec<Section>,
}

impl SegmentSpec {
    /// Run every section in order into a fresh builder
    pub fn control_points(&self) -> Result<SegmentBuilder, TrackError> {
        let mut builder = SegmentBuilder::new(self);
        for section in &self.sections {
            section.parse_into(&mut builder)?;
        }
        Ok(builder)
    }
}

/// One user-supplied section, dispatched to its parser by variant
#[enum_dispatch(SectionParser)]
#[derive(Debug, Clone)]
pub enum Section {
    Point(PointSpec),
    Straight(StraightSpec),
    Spiral(SpiralSpec),
}

/// An oriented point: a plain point section, or the `startsAt`/`endsAt`
/// of a spiral
#[derive(Debug, Clone)]
pub struct PointSpec {
    pub path: FieldPath,
    pub center: DVec3,
    /// Unit length
    pub forward: DVec3,
    pub forward_weight: f64,
    pub backward_weight: f64,
    pub settings: Settings,
    /// Whether `trackBank` was declared on this object itself
    pub explicit_bank: bool,
    pub median_width: Option<f64>,
}

/// Where a straight section ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StraightEnd {
    Length(f64),
    EndsAt(DVec3),
}

#[derive(Debug, Clone)]
pub struct StraightSpec {
    pub path: FieldPath,
    /// Present exactly when the straight opens its segment
    pub starts_at: Option<DVec3>,
    /// Unit length; only given for an opening straight measured by length
    pub forward: Option<DVec3>,
    pub end: StraightEnd,
    pub forward_weight: f64,
    pub backward_weight: f64,
    pub settings: Settings,
    /// Whether `trackBank` was declared on the section itself
    pub explicit_bank: bool,
    pub median_width: Option<f64>,
}

/// Which way a spiral winds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// About a vertical axis, turning left
    Left,
    /// About a vertical axis, turning right
    Right,
    /// About a lateral axis (loops)
    Up,
}

impl Rotation {
    /// Sign applied to the section's bank angle
    pub fn bank_sign(self) -> f64 {
        match self {
            Rotation::Left | Rotation::Up => 1.0,
            Rotation::Right => -1.0,
        }
    }
}

/// Requested spiral tangent estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclinationMode {
    Analytic,
    Heuristic,
}

#[derive(Debug, Clone)]
pub struct SpiralSpec {
    pub path: FieldPath,
    /// Present exactly when the spiral opens its segment
    pub starts_at: Option<PointSpec>,
    pub ends_at: PointSpec,
    pub rotate: Rotation,
    /// Whole extra turns on top of the entry → exit sweep
    pub turns: u32,
    /// Rotation center, only meaningful when entry and exit share a plane
    pub center: Option<DVec3>,
    pub declination: Option<DeclinationMode>,
    /// Fixed declination override in degrees
    pub alt_declination: Option<f64>,
    /// `trackBank` declared on the section itself
    pub bank: Option<Bank>,
    pub settings: Settings,
    pub median_width: Option<f64>,
}
