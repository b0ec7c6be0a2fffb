//! Cross-sections and the four-lane ribbon built from them.

use glam::DVec3;

/// One sample of the track surface at a curve parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossSection {
    pub center: DVec3,
    /// Unit tangent
    pub forward: DVec3,
    /// Unit, perpendicular to `forward`; banking already applied
    pub down: DVec3,
    pub width: f64,
    pub wall_height: f64,
    pub median_width: f64,
}

impl CrossSection {
    /// Lateral unit vector pointing to the driver's right
    #[inline]
    pub fn right(&self) -> DVec3 {
        self.down.cross(self.forward)
    }

    /// The four lane points, ordered left-wall-top, left-road-edge,
    /// right-road-edge, right-wall-top.
    pub fn edges(&self) -> [DVec3; 4] {
        let half = self.right() * (self.width / 2.0);
        let wall = self.down * -self.wall_height;
        let left = self.center - half;
        let right = self.center + half;
        [left + wall, left, right, right + wall]
    }

    /// The four points of the `k`-th median divider (1-based) when the road
    /// is split into `lanes` equal lanes. Same ordering as [`Self::edges`].
    pub fn median_edges(&self, k: usize, lanes: usize) -> [DVec3; 4] {
        let offset = -self.width / 2.0 + self.width * k as f64 / lanes as f64;
        let right = self.right();
        let wall = self.down * -self.wall_height;
        let left = self.center + right * (offset - self.median_width / 2.0);
        let right = self.center + right * (offset + self.median_width / 2.0);
        [left + wall, left, right, right + wall]
    }
}

/// Four parallel polylines appended in lock-step, one point per lane for
/// every cross-section.
#[derive(Debug, Clone, PartialEq)]
pub struct Ribbon<P> {
    lanes: [Vec<P>; 4],
}

impl<P> Default for Ribbon<P> {
    fn default() -> Self {
        Self {
            lanes: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
        }
    }
}

impl<P> Ribbon<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lanes: std::array::from_fn(|_| Vec::with_capacity(capacity)),
        }
    }

    /// Append one cross-section's four points
    pub fn push(&mut self, points: [P; 4]) {
        for (lane, point) in self.lanes.iter_mut().zip(points) {
            lane.push(point);
        }
    }

    /// Number of cross-sections
    pub fn len(&self) -> usize {
        self.lanes[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes[0].is_empty()
    }

    /// All four lanes in order
    pub fn lanes(&self) -> &[Vec<P>; 4] {
        &self.lanes
    }

    pub fn into_lanes(self) -> [Vec<P>; 4] {
        self.lanes
    }

    pub fn left_wall_top(&self) -> &[P] {
        &self.lanes[0]
    }

    pub fn left_road_edge(&self) -> &[P] {
        &self.lanes[1]
    }

    pub fn right_road_edge(&self) -> &[P] {
        &self.lanes[2]
    }

    pub fn right_wall_top(&self) -> &[P] {
        &self.lanes[3]
    }

    /// Convert every point, keeping lane order and length
    pub fn map<Q>(self, mut f: impl FnMut(P) -> Q) -> Ribbon<Q> {
        let [a, b, c, d] = self.lanes;
        let mut convert = |lane: Vec<P>| lane.into_iter().map(&mut f).collect::<Vec<Q>>();
        Ribbon {
            lanes: [convert(a), convert(b), convert(c), convert(d)],
        }
    }
}

impl Ribbon<DVec3> {
    /// Build a ribbon from cross-sections, one point per lane each
    pub fn from_sections(
        sections: &[CrossSection],
        edges: impl Fn(&CrossSection) -> [DVec3; 4],
    ) -> Self {
        let mut ribbon = Ribbon::with_capacity(sections.len());
        for section in sections {
            ribbon.push(edges(section));
        }
        ribbon
    }
}
