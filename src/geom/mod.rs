//! Geometry for track building
//!
//! This module is organized into submodules:
//! - `cylindrical`: (radius, angle, height) coordinates relative to a plane
//! - `plane`: oriented planes, their local axes and intersections
//! - `curve`: control points, cubic Bezier spans and adaptive subdivision
//! - `ribbon`: cross-sections and the four-lane ribbon they feed

pub mod curve;
pub mod cylindrical;
pub mod plane;
pub mod ribbon;

pub use curve::{ControlPoint, Curve, MAX_SUBDIVISION_DEPTH};
pub use cylindrical::Cylindrical;
pub use plane::{HelixFrame, HelixPoint, Line, PARALLEL_TOLERANCE, Plane};
pub use ribbon::{CrossSection, Ribbon};
