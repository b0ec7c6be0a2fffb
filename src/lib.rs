//! Procedural track geometry.
//!
//! A track is described declaratively as segments of sections (plain
//! oriented points, straights and spirals). Each section becomes one or more
//! control points; consecutive points are joined by cubic Bezier spans that
//! are adaptively subdivided until every chord is within `precision` of the
//! curve. The result is a ribbon of four parallel polylines per segment
//! (left wall top, left road edge, right road edge, right wall top) plus
//! optional lane medians.
//!
//! ```
//! use serde_json::json;
//! use tracksmith::{Settings, build_track};
//!
//! let track = build_track(
//!     &json!({"segments": [{"points": [
//!         {"type": "straight", "startsAt": [0, 0, 0], "forward": [1, 0, 0], "length": 10}
//!     ]}]}),
//!     &Settings::default(),
//!     |v| v,
//! )?;
//! assert_eq!(track.segments[0].ribbon.len(), 2);
//! # Ok::<(), tracksmith::TrackError>(())
//! ```

pub mod ast;
pub mod errors;
pub mod geom;
pub mod log;
pub mod parse;
pub mod sections;
pub mod settings;
pub mod track;
pub mod types;

pub use ast::{MAX_LANES, Section, TrackSpec};
pub use errors::{ErrorKind, FieldPath, TrackError};
pub use geom::{ControlPoint, CrossSection, Curve, Plane, Ribbon};
pub use parse::{parse_track, parse_track_str};
pub use settings::{Bank, BankSample, Settings, merge_settings};
pub use track::{Track, TrackSegment, assemble_track, build_segment, build_track, build_track_str};
