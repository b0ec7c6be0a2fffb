//! Track assembly: validated sections → control points → flattened ribbons.

use glam::DVec3;
use serde_json::Value;

use crate::ast::{SegmentSpec, TrackSpec};
use crate::errors::TrackError;
use crate::geom::{CrossSection, Ribbon};
use crate::log::debug;
use crate::parse::{parse_track, parse_track_str};
use crate::settings::Settings;

/// A built track, one entry per input segment
#[derive(Debug, Clone, PartialEq)]
pub struct Track<P> {
    pub segments: Vec<TrackSegment<P>>,
    /// The last cross-section joins back to the first
    pub closed: bool,
}

/// Geometry of one segment
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSegment<P> {
    /// Road surface and walls
    pub ribbon: Ribbon<P>,
    /// Lane dividers, `lanes - 1` of them
    pub medians: Vec<Ribbon<P>>,
}

/// Build a track from an in-memory definition.
///
/// `factory` converts engine vectors into the caller's point type.
pub fn build_track<P>(
    value: &Value,
    settings: &Settings,
    factory: impl Fn(DVec3) -> P,
) -> Result<Track<P>, TrackError> {
    let spec = parse_track(value, settings)?;
    assemble_track(&spec, factory)
}

/// Build a track from JSON text.
pub fn build_track_str<P>(
    text: &str,
    settings: &Settings,
    factory: impl Fn(DVec3) -> P,
) -> Result<Track<P>, TrackError> {
    let spec = parse_track_str(text, settings)?;
    assemble_track(&spec, factory)
}

/// Build every segment of an already validated track.
pub fn assemble_track<P>(
    spec: &TrackSpec,
    factory: impl Fn(DVec3) -> P,
) -> Result<Track<P>, TrackError> {
    let mut segments = Vec::with_capacity(spec.segments.len());
    for segment in &spec.segments {
        let sections = build_segment(segment, spec.closed)?;
        debug!(
            path = %segment.path,
            sections = sections.len(),
            lanes = segment.lanes,
            "built segment"
        );
        let ribbon = Ribbon::from_sections(&sections, CrossSection::edges).map(&factory);
        let medians = (1..segment.lanes)
            .map(|k| {
                Ribbon::from_sections(&sections, |s| s.median_edges(k, segment.lanes)).map(&factory)
            })
            .collect();
        segments.push(TrackSegment { ribbon, medians });
    }
    Ok(Track {
        segments,
        closed: spec.closed,
    })
}

/// Flatten one segment into its ordered cross-sections.
///
/// A closed segment leaves out its final cross-section, which coincides
/// with the first.
pub fn build_segment(segment: &SegmentSpec, closed: bool) -> Result<Vec<CrossSection>, TrackError> {
    let (points, builders) = segment.control_points()?.into_parts();
    if points.len() < 2 || builders.is_empty() {
        return Err(TrackError::range(
            &segment.path.field("points"),
            format!(
                "a segment needs at least 2 points, found {}",
                points.len()
            ),
        ));
    }

    let mut sections = Vec::new();
    let mut last = None;
    for (curve, pair) in builders.iter().zip(points.windows(2)) {
        last = Some(curve.build(&pair[0], &pair[1], &mut sections)?);
    }
    if !closed {
        sections.extend(last);
    }
    Ok(sections)
}
