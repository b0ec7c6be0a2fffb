//! Track definition parser.
//!
//! Turns a raw `serde_json::Value` (or JSON text) into a validated
//! [`TrackSpec`]. All shape, type and range checks happen here, before any
//! geometry is computed, and every failure names the offending field.

use glam::DVec3;
use serde_json::{Map, Value};

use crate::ast::*;
use crate::errors::{FieldPath, TrackError};
use crate::settings::{Settings, merge_settings, validate_bank};
use crate::types::{DEFAULT_FORWARD, VectorExt};

const DEFAULT_WEIGHT: f64 = 1.0;

/// How far `1 - cos` may stray before an explicit forward on a straight
/// counts as disagreeing with its derived direction
const FORWARD_AGREEMENT: f64 = 1e-9;

// ============================================================================
// Primitive readers
// ============================================================================

pub(crate) fn as_object<'a>(
    value: &'a Value,
    path: &FieldPath,
) -> Result<&'a Map<String, Value>, TrackError> {
    value
        .as_object()
        .ok_or_else(|| TrackError::type_mismatch(path, "expected an object"))
}

pub(crate) fn as_number(value: &Value, path: &FieldPath) -> Result<f64, TrackError> {
    match value.as_f64() {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(TrackError::type_mismatch(path, "expected a number")),
    }
}

pub(crate) fn as_positive(value: &Value, path: &FieldPath) -> Result<f64, TrackError> {
    let n = as_number(value, path)?;
    if n > 0.0 {
        Ok(n)
    } else {
        Err(TrackError::range(
            path,
            format!("expected a positive number, got {}", n),
        ))
    }
}

pub(crate) fn as_bool(value: &Value, path: &FieldPath) -> Result<bool, TrackError> {
    value
        .as_bool()
        .ok_or_else(|| TrackError::type_mismatch(path, "expected a boolean"))
}

pub(crate) fn as_str<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a str, TrackError> {
    value
        .as_str()
        .ok_or_else(|| TrackError::type_mismatch(path, "expected a string"))
}

/// A 3-vector is `[x, y, z]` or `{"x": .., "y": .., "z": ..}` with finite numbers.
pub(crate) fn as_vec3(value: &Value, path: &FieldPath) -> Result<DVec3, TrackError> {
    let finite = |v: &Value| v.as_f64().filter(|n| n.is_finite());
    let parsed = match value {
        Value::Array(items) if items.len() == 3 => {
            match (finite(&items[0]), finite(&items[1]), finite(&items[2])) {
                (Some(x), Some(y), Some(z)) => Some(DVec3::new(x, y, z)),
                _ => None,
            }
        }
        Value::Object(obj) => {
            let get = |k: &str| obj.get(k).and_then(finite);
            match (get("x"), get("y"), get("z")) {
                (Some(x), Some(y), Some(z)) => Some(DVec3::new(x, y, z)),
                _ => None,
            }
        }
        _ => None,
    };
    parsed.ok_or_else(|| TrackError::type_mismatch(path, "expected a 3-vector"))
}

/// A whole number in `min..=max`
fn as_count(value: &Value, path: &FieldPath, min: u64, max: u64) -> Result<u64, TrackError> {
    let n = as_number(value, path)?;
    if n.fract() != 0.0 || n < min as f64 || n > max as f64 {
        return Err(TrackError::range(
            path,
            format!("expected a whole number from {} to {}, got {}", min, max, n),
        ));
    }
    Ok(n as u64)
}

/// Field accessor over one input object that remembers where it is.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: FieldPath,
}

impl<'a> Fields<'a> {
    fn new(value: &'a Value, path: FieldPath) -> Result<Self, TrackError> {
        Ok(Self {
            map: as_object(value, &path)?,
            path,
        })
    }

    /// Defined (present and not `null`) field value
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn at(&self, key: &str) -> FieldPath {
        self.path.field(key)
    }

    fn require(&self, key: &str) -> Result<&'a Value, TrackError> {
        self.get(key)
            .ok_or_else(|| TrackError::type_mismatch(&self.at(key), "required field is missing"))
    }

    fn vec3(&self, key: &str) -> Result<Option<DVec3>, TrackError> {
        self.get(key).map(|v| as_vec3(v, &self.at(key))).transpose()
    }

    fn require_vec3(&self, key: &str) -> Result<DVec3, TrackError> {
        as_vec3(self.require(key)?, &self.at(key))
    }

    fn positive(&self, key: &str) -> Result<Option<f64>, TrackError> {
        self.get(key).map(|v| as_positive(v, &self.at(key))).transpose()
    }

    fn number(&self, key: &str) -> Result<Option<f64>, TrackError> {
        self.get(key).map(|v| as_number(v, &self.at(key))).transpose()
    }

    fn bool(&self, key: &str) -> Result<Option<bool>, TrackError> {
        self.get(key).map(|v| as_bool(v, &self.at(key))).transpose()
    }

    fn str(&self, key: &str) -> Result<Option<&'a str>, TrackError> {
        self.get(key).map(|v| as_str(v, &self.at(key))).transpose()
    }

    fn count(&self, key: &str, min: u64, max: u64) -> Result<Option<u64>, TrackError> {
        self.get(key).map(|v| as_count(v, &self.at(key), min, max)).transpose()
    }

    /// Non-empty array field
    fn items(&self, key: &str) -> Result<&'a [Value], TrackError> {
        let items = self
            .require(key)?
            .as_array()
            .ok_or_else(|| TrackError::type_mismatch(&self.at(key), "expected an array"))?;
        if items.is_empty() {
            return Err(TrackError::range(&self.at(key), "must not be empty"));
        }
        Ok(items)
    }

    fn forbid(&self, key: &str, why: &str) -> Result<(), TrackError> {
        if self.has(key) {
            return Err(TrackError::type_mismatch(&self.at(key), why));
        }
        Ok(())
    }

    fn settings(&self, parent: &Settings) -> Result<Settings, TrackError> {
        merge_settings(parent, self.map, &self.path)
    }

    /// Section-level settings: any recognized key except `precision`
    fn section_settings(&self, parent: &Settings) -> Result<Settings, TrackError> {
        if self.has("precision") {
            return Err(TrackError::range(
                &self.at("precision"),
                "precision can only be set on a track or segment",
            ));
        }
        self.settings(parent)
    }

    fn unit(&self, key: &str) -> Result<Option<DVec3>, TrackError> {
        self.vec3(key)?
            .map(|v| v.try_unit("forward"))
            .transpose()
    }
}

// ============================================================================
// Track / segment
// ============================================================================

/// Parse JSON text into a validated track definition.
pub fn parse_track_str(text: &str, settings: &Settings) -> Result<TrackSpec, TrackError> {
    let value: Value = serde_json::from_str(text)?;
    parse_track(&value, settings)
}

/// Validate a track definition against application-level `settings`.
pub fn parse_track(value: &Value, settings: &Settings) -> Result<TrackSpec, TrackError> {
    let track = Fields::new(value, FieldPath::root("track"))?;
    let settings = track.settings(settings)?;
    let raw_segments = track.items("segments")?;

    let closed = track.bool("closed")?.unwrap_or(false);
    if closed && raw_segments.len() != 1 {
        return Err(TrackError::range(
            &track.at("closed"),
            format!(
                "only a single-segment track can be closed, found {} segments",
                raw_segments.len()
            ),
        ));
    }

    let segments_path = track.at("segments");
    let segments = raw_segments
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_segment(raw, segments_path.index(i), &settings))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TrackSpec {
        segments,
        closed,
        settings,
    })
}

fn parse_segment(
    value: &Value,
    path: FieldPath,
    parent: &Settings,
) -> Result<SegmentSpec, TrackError> {
    let segment = Fields::new(value, path)?;
    let settings = segment.settings(parent)?;
    let lanes = segment.count("lanes", 1, MAX_LANES as u64)?.unwrap_or(1) as usize;
    let raw_points = segment.items("points")?;

    let points_path = segment.at("points");
    let sections = raw_points
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_section(raw, points_path.index(i), &settings, i == 0))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SegmentSpec {
        path: segment.path,
        settings,
        lanes,
        sections,
    })
}

/// Dispatch a raw section on its `type` tag (default `"point"`).
fn parse_section(
    value: &Value,
    path: FieldPath,
    parent: &Settings,
    opens_segment: bool,
) -> Result<Section, TrackError> {
    let fields = Fields::new(value, path)?;
    let tag = fields.str("type")?.unwrap_or("point");
    match tag {
        "point" => parse_point(&fields, parent).map(Section::from),
        "straight" => parse_straight(&fields, parent, opens_segment).map(Section::from),
        "spiral" => parse_spiral(&fields, parent, opens_segment).map(Section::from),
        other => Err(TrackError::UnknownSection {
            path: fields.at("type").to_string(),
            tag: other.to_string(),
        }),
    }
}

// ============================================================================
// Sections
// ============================================================================

fn parse_point(fields: &Fields<'_>, parent: &Settings) -> Result<PointSpec, TrackError> {
    let settings = fields.section_settings(parent)?;
    let center = fields.require_vec3("center")?;
    let forward = fields.unit("forward")?.unwrap_or(DEFAULT_FORWARD);
    Ok(PointSpec {
        path: fields.path.clone(),
        center,
        forward,
        forward_weight: fields.positive("forwardWeight")?.unwrap_or(DEFAULT_WEIGHT),
        backward_weight: fields.positive("backwardWeight")?.unwrap_or(DEFAULT_WEIGHT),
        settings,
        explicit_bank: fields.has("trackBank"),
        median_width: fields.positive("medianWidth")?,
    })
}

fn parse_straight(
    fields: &Fields<'_>,
    parent: &Settings,
    opens_segment: bool,
) -> Result<StraightSpec, TrackError> {
    let settings = fields.section_settings(parent)?;

    let end = match (fields.positive("length")?, fields.vec3("endsAt")?) {
        (Some(length), None) => StraightEnd::Length(length),
        (None, Some(ends_at)) => StraightEnd::EndsAt(ends_at),
        (Some(_), Some(_)) => {
            return Err(TrackError::type_mismatch(
                &fields.path,
                "straight takes either `length` or `endsAt`, not both",
            ));
        }
        (None, None) => {
            return Err(TrackError::type_mismatch(
                &fields.path,
                "straight needs one of `length` or `endsAt`",
            ));
        }
    };

    let (starts_at, forward) = if opens_segment {
        let starts_at = fields.require_vec3("startsAt")?;
        let forward = match end {
            StraightEnd::Length(_) => Some(fields.require_vec3("forward")?.try_unit("forward")?),
            StraightEnd::EndsAt(ends_at) => {
                let derived = starts_at.to(ends_at).try_unit("straight direction");
                if let (Some(forward), Ok(derived)) = (fields.unit("forward")?, derived) {
                    if forward.dot(derived) < 1.0 - FORWARD_AGREEMENT {
                        return Err(TrackError::range(
                            &fields.at("forward"),
                            "forward disagrees with the direction from `startsAt` to `endsAt`",
                        ));
                    }
                }
                None
            }
        };
        (Some(starts_at), forward)
    } else {
        let inherited = "an interior straight starts where the previous section ends";
        fields.forbid("startsAt", inherited)?;
        fields.forbid("forward", inherited)?;
        (None, None)
    };

    if let (Some(start), StraightEnd::EndsAt(ends_at)) = (starts_at, end) {
        if start.distance_squared(ends_at) == 0.0 {
            return Err(TrackError::range(
                &fields.at("endsAt"),
                "endsAt coincides with startsAt",
            ));
        }
    }

    Ok(StraightSpec {
        path: fields.path.clone(),
        starts_at,
        forward,
        end,
        forward_weight: fields.positive("forwardWeight")?.unwrap_or(DEFAULT_WEIGHT),
        backward_weight: fields.positive("backwardWeight")?.unwrap_or(DEFAULT_WEIGHT),
        settings,
        explicit_bank: fields.has("trackBank"),
        median_width: fields.positive("medianWidth")?,
    })
}

fn parse_spiral(
    fields: &Fields<'_>,
    parent: &Settings,
    opens_segment: bool,
) -> Result<SpiralSpec, TrackError> {
    let settings = fields.section_settings(parent)?;

    let starts_at = if opens_segment {
        let value = fields.require("startsAt")?;
        let starts_at = Fields::new(value, fields.at("startsAt"))?;
        Some(parse_point(&starts_at, &settings)?)
    } else {
        fields.forbid(
            "startsAt",
            "an interior spiral starts where the previous section ends",
        )?;
        None
    };
    let ends_at = Fields::new(fields.require("endsAt")?, fields.at("endsAt"))?;
    let ends_at = parse_point(&ends_at, &settings)?;

    let rotate = match fields.str("rotate")?.unwrap_or("left") {
        "left" => Rotation::Left,
        "right" => Rotation::Right,
        "up" => Rotation::Up,
        other => {
            return Err(TrackError::range(
                &fields.at("rotate"),
                format!("expected \"left\", \"right\" or \"up\", got {:?}", other),
            ));
        }
    };

    let declination = match fields.str("declination")? {
        None => None,
        Some("analytic") => Some(DeclinationMode::Analytic),
        Some("heuristic") => Some(DeclinationMode::Heuristic),
        Some(other) => {
            return Err(TrackError::range(
                &fields.at("declination"),
                format!("expected \"analytic\" or \"heuristic\", got {:?}", other),
            ));
        }
    };

    let bank = fields
        .get("trackBank")
        .map(|v| validate_bank(v, &fields.at("trackBank")))
        .transpose()?;

    Ok(SpiralSpec {
        path: fields.path.clone(),
        starts_at,
        ends_at,
        rotate,
        turns: fields.count("turns", 0, u32::MAX as u64)?.unwrap_or(0) as u32,
        center: fields.vec3("center")?,
        declination,
        alt_declination: fields.number("altDeclination")?,
        bank,
        settings,
        median_width: fields.positive("medianWidth")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::settings::Bank;
    use glam::dvec3;
    use serde_json::json;

    fn parse(value: Value) -> Result<TrackSpec, TrackError> {
        parse_track(&value, &Settings::default())
    }

    fn one_segment(points: Value) -> Value {
        json!({"segments": [{"points": points}]})
    }

    #[test]
    fn parse_minimal_point_track() {
        let spec = parse(one_segment(json!([
            {"center": [0, 0, 0]},
            {"center": {"x": 10, "y": 0, "z": 0}, "forward": [2, 0, 0]}
        ])))
        .unwrap();
        assert_eq!(spec.segments.len(), 1);
        assert!(!spec.closed);
        let Section::Point(p) = &spec.segments[0].sections[1] else {
            panic!("expected a point section");
        };
        assert_eq!(p.center, dvec3(10.0, 0.0, 0.0));
        assert_eq!(p.forward, dvec3(1.0, 0.0, 0.0));
        assert_eq!(p.forward_weight, 1.0);
        assert_eq!(p.backward_weight, 1.0);
    }

    #[test]
    fn point_forward_defaults_to_x() {
        let spec = parse(one_segment(json!([{"center": [1, 2, 3]}]))).unwrap();
        let Section::Point(p) = &spec.segments[0].sections[0] else {
            panic!("expected a point section");
        };
        assert_eq!(p.forward, DEFAULT_FORWARD);
    }

    #[test]
    fn point_requires_center() {
        let err = parse(one_segment(json!([{"forward": [1, 0, 0]}]))).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"type mismatch at `track.segments[0].points[0].center`: required field is missing");
    }

    #[test]
    fn point_rejects_bad_weight_with_field_path() {
        let err = parse(json!({"segments": [
            {"points": [{"center": [0, 0, 0]}, {"center": [1, 0, 0]}]},
            {"points": [{"center": [0, 0, 0]}, {"center": [1, 0, 0]}, {"center": [2, 0, 0], "forwardWeight": 0}]}
        ]}))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        insta::assert_snapshot!(err.to_string(), @"value out of range at `track.segments[1].points[2].forwardWeight`: expected a positive number, got 0");
    }

    #[test]
    fn point_rejects_precision_override() {
        let err = parse(one_segment(json!([{"center": [0, 0, 0], "precision": 0.1}]))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn point_rejects_zero_forward() {
        let err = parse(one_segment(json!([{"center": [0, 0, 0], "forward": [0, 0, 0]}])))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DivisionByZero);
    }

    #[test]
    fn vectors_must_have_three_numbers() {
        for bad in [json!([0, 0]), json!([0, "a", 0]), json!({"x": 0, "y": 0}), json!(4)] {
            let err = parse(one_segment(json!([{"center": bad}]))).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        }
    }

    #[test]
    fn unknown_section_type_rejected() {
        let err = parse(one_segment(json!([{"type": "loop", "center": [0, 0, 0]}]))).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @r#"unknown section type "loop" at `track.segments[0].points[0].type`"#);
    }

    #[test]
    fn settings_inherit_down_to_sections() {
        let spec = parse(json!({
            "trackWidth": 12,
            "precision": 0.5,
            "segments": [{
                "wallHeight": 3,
                "points": [
                    {"center": [0, 0, 0]},
                    {"center": [5, 0, 0], "trackWidth": 6, "trackBank": 10}
                ]
            }]
        }))
        .unwrap();
        assert_eq!(spec.settings.track_width, 12.0);
        let segment = &spec.segments[0];
        assert_eq!(segment.settings.precision, 0.5);
        assert_eq!(segment.settings.wall_height, 3.0);
        let Section::Point(first) = &segment.sections[0] else {
            panic!("expected a point section");
        };
        assert_eq!(first.settings.track_width, 12.0);
        assert!(!first.explicit_bank);
        let Section::Point(second) = &segment.sections[1] else {
            panic!("expected a point section");
        };
        assert_eq!(second.settings.track_width, 6.0);
        assert_eq!(second.settings.wall_height, 3.0);
        assert_eq!(second.settings.track_bank, Bank::Angle(10.0));
        assert!(second.explicit_bank);
    }

    #[test]
    fn track_needs_segments_and_points() {
        assert_eq!(parse(json!({})).unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert_eq!(parse(json!({"segments": []})).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(
            parse(json!({"segments": [{"points": []}]})).unwrap_err().kind(),
            ErrorKind::Range
        );
        assert_eq!(
            parse(json!({"segments": [{"points": 3}]})).unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
        assert_eq!(parse(json!([1, 2])).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn closed_requires_single_segment() {
        let seg = json!({"points": [{"center": [0, 0, 0]}, {"center": [1, 0, 0]}]});
        let err = parse(json!({"closed": true, "segments": [seg.clone(), seg.clone()]})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(parse(json!({"closed": true, "segments": [seg.clone()]})).unwrap().closed);
        let err = parse(json!({"closed": "yes", "segments": [seg]})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn straight_rejects_length_and_ends_at() {
        let err = parse(one_segment(json!([
            {"center": [0, 0, 0]},
            {"type": "straight", "length": 10, "endsAt": [10, 0, 0]}
        ])))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        insta::assert_snapshot!(err.to_string(), @"type mismatch at `track.segments[0].points[1]`: straight takes either `length` or `endsAt`, not both");
    }

    #[test]
    fn straight_requires_length_or_ends_at() {
        let err = parse(one_segment(json!([
            {"center": [0, 0, 0]},
            {"type": "straight"}
        ])))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn opening_straight_needs_start_and_forward() {
        let err = parse(one_segment(json!([{"type": "straight", "length": 10}]))).unwrap_err();
        assert!(err.to_string().contains("startsAt"));

        let err = parse(one_segment(json!([
            {"type": "straight", "length": 10, "startsAt": [0, 0, 0]}
        ])))
        .unwrap_err();
        assert!(err.to_string().contains("forward"));

        let spec = parse(one_segment(json!([
            {"type": "straight", "endsAt": [0, 0, 5], "startsAt": [0, 0, 0]}
        ])))
        .unwrap();
        let Section::Straight(s) = &spec.segments[0].sections[0] else {
            panic!("expected a straight section");
        };
        assert_eq!(s.starts_at, Some(DVec3::ZERO));
        assert_eq!(s.forward, None);
        assert_eq!(s.end, StraightEnd::EndsAt(dvec3(0.0, 0.0, 5.0)));
    }

    #[test]
    fn interior_straight_may_not_redeclare_start() {
        let err = parse(one_segment(json!([
            {"center": [0, 0, 0]},
            {"type": "straight", "length": 3, "startsAt": [0, 0, 0]}
        ])))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("points[1].startsAt"));
    }

    #[test]
    fn spiral_fields_parse() {
        let spec = parse(one_segment(json!([
            {"center": [0, 0, 0]},
            {
                "type": "spiral",
                "rotate": "right",
                "turns": 2,
                "altDeclination": 4.5,
                "declination": "heuristic",
                "trackBank": 20,
                "endsAt": {"center": [10, 0, 10], "forward": [1, 0, 0]}
            }
        ])))
        .unwrap();
        let Section::Spiral(s) = &spec.segments[0].sections[1] else {
            panic!("expected a spiral section");
        };
        assert_eq!(s.rotate, Rotation::Right);
        assert_eq!(s.turns, 2);
        assert_eq!(s.alt_declination, Some(4.5));
        assert_eq!(s.declination, Some(DeclinationMode::Heuristic));
        assert_eq!(s.bank, Some(Bank::Angle(20.0)));
        assert!(s.starts_at.is_none());
        assert_eq!(s.ends_at.center, dvec3(10.0, 0.0, 10.0));
        assert_eq!(s.ends_at.path.as_str(), "track.segments[0].points[1].endsAt");
    }

    #[test]
    fn spiral_rejects_bad_turns_and_rotation() {
        let base = |extra: Value| {
            let mut spiral = json!({"type": "spiral", "endsAt": {"center": [1, 0, 1]}});
            for (k, v) in extra.as_object().unwrap() {
                spiral[k] = v.clone();
            }
            parse(one_segment(json!([{"center": [0, 0, 0]}, spiral])))
        };
        assert_eq!(base(json!({"turns": -1})).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(base(json!({"turns": 1.5})).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(base(json!({"turns": "1"})).unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert_eq!(base(json!({"rotate": "sideways"})).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(
            base(json!({"startsAt": {"center": [0, 0, 0]}})).unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
        assert!(base(json!({})).is_ok());
    }

    #[test]
    fn spiral_requires_ends_at() {
        let err = parse(one_segment(json!([
            {"center": [0, 0, 0]},
            {"type": "spiral", "rotate": "left"}
        ])))
        .unwrap_err();
        assert!(err.to_string().contains("points[1].endsAt"));
    }

    #[test]
    fn lanes_must_be_positive_whole_number() {
        let err = parse(json!({"segments": [{"lanes": 0, "points": [{"center": [0, 0, 0]}]}]}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        let spec =
            parse(json!({"segments": [{"lanes": 3, "points": [{"center": [0, 0, 0]}]}]})).unwrap();
        assert_eq!(spec.segments[0].lanes, 3);
    }

    #[test]
    fn lanes_are_capped() {
        let err = parse(json!({"segments": [{"lanes": 4294967295u64, "points": [{"center": [0, 0, 0]}]}]}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        insta::assert_snapshot!(err.to_string(), @"value out of range at `track.segments[0].lanes`: expected a whole number from 1 to 64, got 4294967295");
        let spec = parse(json!({"segments": [{"lanes": MAX_LANES, "points": [{"center": [0, 0, 0]}]}]}))
            .unwrap();
        assert_eq!(spec.segments[0].lanes, MAX_LANES);
    }

    #[test]
    fn opening_straight_accepts_matching_forward() {
        let spec = parse(one_segment(json!([
            {"type": "straight", "startsAt": [0, 0, 0], "endsAt": [0, 0, 5], "forward": [0, 0, 2]}
        ])))
        .unwrap();
        let Section::Straight(s) = &spec.segments[0].sections[0] else {
            panic!("expected a straight section");
        };
        assert_eq!(s.forward, None);

        let err = parse(one_segment(json!([
            {"type": "straight", "startsAt": [0, 0, 0], "endsAt": [0, 0, 5], "forward": [1, 0, 0]}
        ])))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(err.to_string().contains("points[0].forward"));
    }

    #[test]
    fn parse_track_str_reports_syntax_errors() {
        let err = parse_track_str("{\"segments\": [", &Settings::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}
