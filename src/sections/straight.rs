use glam::DVec3;

use super::{SectionParser, SegmentBuilder};
use crate::ast::{StraightEnd, StraightSpec};
use crate::errors::TrackError;
use crate::geom::ControlPoint;
use crate::types::VectorExt;

impl StraightSpec {
    fn control_point(&self, center: DVec3, forward: DVec3) -> ControlPoint {
        ControlPoint {
            center,
            forward,
            forward_weight: self.forward_weight,
            backward_weight: self.backward_weight,
            track_width: self.settings.track_width,
            wall_height: self.settings.wall_height,
            track_bank: self.settings.track_bank.clone(),
            explicit_bank: self.explicit_bank,
            median_width: self.median_width,
        }
    }

    fn direction(&self, start: DVec3, end: DVec3) -> Result<DVec3, TrackError> {
        start.to(end).try_unit("straight direction").map_err(|_| {
            TrackError::degenerate(
                &self.path.field("endsAt"),
                "endsAt coincides with the start of the straight",
            )
        })
    }
}

impl SectionParser for StraightSpec {
    fn parse_into(&self, segment: &mut SegmentBuilder) -> Result<(), TrackError> {
        let (start, forward) = match (self.starts_at, self.end) {
            (Some(start), StraightEnd::Length(_)) => {
                let forward = self.forward.ok_or_else(|| {
                    TrackError::type_mismatch(&self.path.field("forward"), "required field is missing")
                })?;
                segment.push(self.control_point(start, forward));
                (start, forward)
            }
            (Some(start), StraightEnd::EndsAt(end)) => {
                let forward = self.direction(start, end)?;
                segment.push(self.control_point(start, forward));
                (start, forward)
            }
            (None, _) => {
                let previous = segment.previous(&self.path)?;
                (previous.center, previous.forward)
            }
        };

        let end = match self.end {
            StraightEnd::Length(length) => self.control_point(start.add_scaled(length, forward), forward),
            StraightEnd::EndsAt(end) => self.control_point(end, self.direction(start, end)?),
        };
        segment.push(end);
        Ok(())
    }
}
