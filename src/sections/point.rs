use super::{SectionParser, SegmentBuilder};
use crate::ast::PointSpec;
use crate::errors::TrackError;
use crate::geom::ControlPoint;

impl PointSpec {
    /// Control point carrying this point's own settings
    pub fn control_point(&self) -> ControlPoint {
        ControlPoint {
            center: self.center,
            forward: self.forward,
            forward_weight: self.forward_weight,
            backward_weight: self.backward_weight,
            track_width: self.settings.track_width,
            wall_height: self.settings.wall_height,
            track_bank: self.settings.track_bank.clone(),
            explicit_bank: self.explicit_bank,
            median_width: self.median_width,
        }
    }
}

impl SectionParser for PointSpec {
    fn parse_into(&self, segment: &mut SegmentBuilder) -> Result<(), TrackError> {
        segment.push(self.control_point());
        Ok(())
    }
}
