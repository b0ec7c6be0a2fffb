//! Error types with diagnostic codes using miette
//!
//! Input errors carry the dotted field path of the offending value so a
//! caller can point at the exact spot in a track definition.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Dotted/indexed location of a value inside a track definition,
/// e.g. `track.segments[1].points[2].forwardWeight`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(String);

impl FieldPath {
    /// Start a path at a named context (`track`, `settings`, ...)
    pub fn root(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Path of a named child field
    pub fn field(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{}", self.0, key))
        }
    }

    /// Path of an array element
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{}]", self.0, i))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse classification of a [`TrackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong shape or type in the input
    TypeMismatch,
    /// Right type, value outside its domain
    Range,
    /// A zero-length vector had to be normalized
    DivisionByZero,
    /// Input is well-formed but describes impossible geometry
    Geometry,
    /// Geometry case the engine deliberately refuses to guess at
    NotImplemented,
    /// Subdivision or spiral span budget exhausted
    ResourceLimit,
    /// Input text is not valid JSON
    Syntax,
}

// ============================================================================
// Track Errors
// ============================================================================

/// Errors raised while validating a track definition or building its geometry
#[derive(Error, Diagnostic, Debug)]
pub enum TrackError {
    #[error("type mismatch at `{path}`: {message}")]
    #[diagnostic(code(tracksmith::input::type_mismatch))]
    TypeMismatch { path: String, message: String },

    #[error("value out of range at `{path}`: {message}")]
    #[diagnostic(code(tracksmith::input::range))]
    Range { path: String, message: String },

    #[error("unknown section type {tag:?} at `{path}`")]
    #[diagnostic(
        code(tracksmith::input::unknown_section),
        help("section `type` must be one of \"point\", \"straight\" or \"spiral\"")
    )]
    UnknownSection { path: String, tag: String },

    #[error("division by zero while normalizing {what}")]
    #[diagnostic(code(tracksmith::geometry::division_by_zero))]
    DivisionByZero { what: &'static str },

    #[error("degenerate geometry at `{path}`: {message}")]
    #[diagnostic(code(tracksmith::geometry::degenerate))]
    Degenerate { path: String, message: String },

    #[error("not implemented at `{path}`: {feature}")]
    #[diagnostic(code(tracksmith::geometry::not_implemented))]
    NotImplemented { path: String, feature: &'static str },

    #[error("curve subdivision exceeded {max_depth} levels (precision {precision})")]
    #[diagnostic(
        code(tracksmith::curve::subdivision_limit),
        help("raise `precision` or separate near-coincident control points")
    )]
    SubdivisionLimit { max_depth: usize, precision: f64 },

    #[error("spiral at `{path}` needs {arcs} spans, more than the limit of {max_arcs}")]
    #[diagnostic(
        code(tracksmith::spiral::arc_limit),
        help("lower `turns` or split the spiral into several sections")
    )]
    ArcLimit {
        path: String,
        arcs: f64,
        max_arcs: usize,
    },

    #[error("invalid track JSON: {0}")]
    #[diagnostic(code(tracksmith::input::json))]
    Json(#[from] serde_json::Error),
}

impl TrackError {
    pub(crate) fn type_mismatch(path: &FieldPath, message: impl Into<String>) -> Self {
        TrackError::TypeMismatch {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn range(path: &FieldPath, message: impl Into<String>) -> Self {
        TrackError::Range {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn degenerate(path: &FieldPath, message: impl Into<String>) -> Self {
        TrackError::Degenerate {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn not_implemented(path: &FieldPath, feature: &'static str) -> Self {
        TrackError::NotImplemented {
            path: path.to_string(),
            feature,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackError::TypeMismatch { .. } | TrackError::UnknownSection { .. } => {
                ErrorKind::TypeMismatch
            }
            TrackError::Range { .. } => ErrorKind::Range,
            TrackError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            TrackError::Degenerate { .. } => ErrorKind::Geometry,
            TrackError::NotImplemented { .. } => ErrorKind::NotImplemented,
            TrackError::SubdivisionLimit { .. } | TrackError::ArcLimit { .. } => {
                ErrorKind::ResourceLimit
            }
            TrackError::Json(_) => ErrorKind::Syntax,
        }
    }

    /// Attach a location to a geometry error raised without one.
    ///
    /// Planes and vectors know nothing about the input; the section that
    /// drove them fills in where it happened. Errors that already carry a
    /// path keep it.
    pub fn at(self, location: &FieldPath) -> Self {
        match self {
            TrackError::Degenerate { path, message } if path.is_empty() => TrackError::Degenerate {
                path: location.to_string(),
                message,
            },
            TrackError::NotImplemented { path, feature } if path.is_empty() => {
                TrackError::NotImplemented {
                    path: location.to_string(),
                    feature,
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_path_builds_dotted_and_indexed_segments() {
        let path = FieldPath::root("track")
            .field("segments")
            .index(1)
            .field("points")
            .index(2)
            .field("forwardWeight");
        assert_eq!(path.as_str(), "track.segments[1].points[2].forwardWeight");
    }

    #[test]
    fn field_path_from_empty_root_has_no_leading_dot() {
        assert_eq!(FieldPath::default().field("precision").as_str(), "precision");
    }

    #[test]
    fn unknown_section_is_a_type_mismatch() {
        let err = TrackError::UnknownSection {
            path: "track.segments[0].points[0].type".into(),
            tag: "loop".into(),
        };
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn at_fills_only_missing_locations() {
        let here = FieldPath::root("track").field("segments").index(0);
        let err = TrackError::degenerate(&FieldPath::default(), "flat").at(&here);
        assert_eq!(err.to_string(), "degenerate geometry at `track.segments[0]`: flat");

        let elsewhere = FieldPath::root("settings");
        let err = TrackError::degenerate(&elsewhere, "flat").at(&here);
        assert_eq!(err.to_string(), "degenerate geometry at `settings`: flat");
    }
}
