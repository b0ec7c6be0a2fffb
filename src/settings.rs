//! Track settings: the recognized option registry, per-key validators and
//! parent → child inheritance.
//!
//! Settings flow top-down. The application supplies defaults, the track
//! object overrides them, each segment overrides the track, and each section
//! may override again. Only recognized keys are merged; anything else on an
//! object is left for the section parsers (or ignored).

use glam::DVec3;
use serde_json::{Map, Value};

use crate::errors::{FieldPath, TrackError};
use crate::parse::{as_bool, as_number, as_positive, as_str, as_vec3};
use crate::types::normalize_bank;

pub const DEFAULT_PRECISION: f64 = 0.05;
pub const DEFAULT_TRACK_WIDTH: f64 = 8.0;
pub const DEFAULT_WALL_HEIGHT: f64 = 1.0;

/// Banking of the cross-section about the forward direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Bank {
    /// Degrees in (-180, 180]; positive lowers the left edge
    Angle(f64),
    /// Explicit "down" direction for the cross-section
    Vector(DVec3),
    /// Piecewise-linear angle schedule over a span or section
    Schedule(Vec<BankSample>),
}

/// One sample of a bank schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankSample {
    pub t: f64,
    pub value: f64,
}

impl Default for Bank {
    fn default() -> Self {
        Bank::Angle(0.0)
    }
}

impl Bank {
    /// Bank angle at parameter `t` (clamped to [0, 1]).
    ///
    /// Returns `None` for a vector override, which has no angle.
    pub fn angle_at(&self, t: f64) -> Option<f64> {
        match self {
            Bank::Angle(a) => Some(*a),
            Bank::Vector(_) => None,
            Bank::Schedule(samples) => Some(interpolate_schedule(samples, t)),
        }
    }

    /// Scale angles by `sign`; vector overrides pass through untouched.
    pub fn scaled(&self, sign: f64) -> Bank {
        match self {
            Bank::Angle(a) => Bank::Angle(normalize_bank(a * sign)),
            Bank::Vector(v) => Bank::Vector(*v),
            Bank::Schedule(samples) => Bank::Schedule(
                samples
                    .iter()
                    .map(|s| BankSample {
                        t: s.t,
                        value: s.value * sign,
                    })
                    .collect(),
            ),
        }
    }

    /// Resolve to a fixed bank at `t`: schedules collapse to an angle.
    pub fn resolved_at(&self, t: f64) -> Bank {
        match self {
            Bank::Schedule(samples) => Bank::Angle(interpolate_schedule(samples, t)),
            other => other.clone(),
        }
    }
}

fn interpolate_schedule(samples: &[BankSample], t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let Some(first) = samples.first() else {
        return 0.0;
    };
    let mut prev = first;
    for sample in &samples[1..] {
        if t <= sample.t {
            let span = sample.t - prev.t;
            let local = if span > 0.0 { (t - prev.t) / span } else { 1.0 };
            return prev.value + (sample.value - prev.value) * local;
        }
        prev = sample;
    }
    prev.value
}

/// Effective settings at one level of the track hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Subdivision error tolerance (world units)
    pub precision: f64,
    pub track_bank: Bank,
    pub track_width: f64,
    pub wall_height: f64,
    /// Log every emitted cross-section (needs the `tracing` feature)
    pub debug: bool,
    /// Tag attached to debug output
    pub debug_label: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            track_bank: Bank::default(),
            track_width: DEFAULT_TRACK_WIDTH,
            wall_height: DEFAULT_WALL_HEIGHT,
            debug: false,
            debug_label: None,
        }
    }
}

impl Settings {
    /// Validate an application-level settings object over the defaults.
    pub fn from_json(value: &Value) -> Result<Self, TrackError> {
        let path = FieldPath::root("settings");
        let map = value
            .as_object()
            .ok_or_else(|| TrackError::type_mismatch(&path, "expected an object"))?;
        merge_settings(&Settings::default(), map, &path)
    }
}

/// Validator bound to a recognized key
#[derive(Debug, Clone, Copy)]
enum Validator {
    PositiveNumber,
    Bank,
    Boolean,
    String,
}

/// A validated override value
enum SettingValue {
    Number(f64),
    Bank(Bank),
    Boolean(bool),
    String(String),
}

const RECOGNIZED: [(&str, Validator); 6] = [
    ("precision", Validator::PositiveNumber),
    ("trackBank", Validator::Bank),
    ("trackWidth", Validator::PositiveNumber),
    ("wallHeight", Validator::PositiveNumber),
    ("debug", Validator::Boolean),
    ("debugLabel", Validator::String),
];

/// Whether `key` is one of the recognized setting keys
pub fn is_setting_key(key: &str) -> bool {
    RECOGNIZED.iter().any(|(k, _)| *k == key)
}

impl Validator {
    fn validate(self, value: &Value, path: &FieldPath) -> Result<SettingValue, TrackError> {
        Ok(match self {
            Validator::PositiveNumber => SettingValue::Number(as_positive(value, path)?),
            Validator::Bank => SettingValue::Bank(validate_bank(value, path)?),
            Validator::Boolean => SettingValue::Boolean(as_bool(value, path)?),
            Validator::String => SettingValue::String(as_str(value, path)?.to_string()),
        })
    }
}

impl Settings {
    fn apply(&mut self, key: &str, value: SettingValue) {
        match (key, value) {
            ("precision", SettingValue::Number(n)) => self.precision = n,
            ("trackWidth", SettingValue::Number(n)) => self.track_width = n,
            ("wallHeight", SettingValue::Number(n)) => self.wall_height = n,
            ("trackBank", SettingValue::Bank(b)) => self.track_bank = b,
            ("debug", SettingValue::Boolean(b)) => self.debug = b,
            ("debugLabel", SettingValue::String(s)) => self.debug_label = Some(s),
            _ => unreachable!("validator/key mismatch in settings registry"),
        }
    }
}

/// Produce `parent` with every recognized, defined key of `overrides`
/// substituted after validation. Unrecognized keys are ignored and `null`
/// counts as undefined. `parent` is never mutated.
pub fn merge_settings(
    parent: &Settings,
    overrides: &Map<String, Value>,
    path: &FieldPath,
) -> Result<Settings, TrackError> {
    let mut merged = parent.clone();
    for (key, validator) in RECOGNIZED {
        match overrides.get(key) {
            None | Some(Value::Null) => {}
            Some(value) => {
                let value = validator.validate(value, &path.field(key))?;
                merged.apply(key, value);
            }
        }
    }
    Ok(merged)
}

/// Validate a bank spec: an angle, a 3-vector, or an interpolation array.
pub fn validate_bank(value: &Value, path: &FieldPath) -> Result<Bank, TrackError> {
    match value {
        Value::Number(_) => Ok(Bank::Angle(normalize_bank(as_number(value, path)?))),
        Value::Array(items) if items.first().is_some_and(Value::is_object) => {
            validate_schedule(items, path).map(Bank::Schedule)
        }
        Value::Array(_) | Value::Object(_) => {
            let v = as_vec3(value, path)?;
            if v.length_squared() == 0.0 {
                return Err(TrackError::range(path, "bank vector must be non-zero"));
            }
            Ok(Bank::Vector(v))
        }
        _ => Err(TrackError::type_mismatch(
            path,
            "expected a bank angle, a 3-vector or an interpolation array",
        )),
    }
}

/// Validate an interpolation array: at least two `{t, value}` samples with
/// numeric fields, `t` strictly increasing, first `t == 0`, last `t == 1`.
fn validate_schedule(items: &[Value], path: &FieldPath) -> Result<Vec<BankSample>, TrackError> {
    if items.len() < 2 {
        return Err(TrackError::range(
            path,
            "interpolation array needs at least 2 samples",
        ));
    }
    let mut samples: Vec<BankSample> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let item_path = path.index(i);
        let sample = item
            .as_object()
            .and_then(|obj| {
                let t = obj.get("t")?.as_f64()?;
                let value = obj.get("value").or_else(|| obj.get("v"))?.as_f64()?;
                Some(BankSample { t, value })
            })
            .filter(|s| s.t.is_finite() && s.value.is_finite())
            .ok_or_else(|| {
                TrackError::range(&item_path, "sample must be an object with numeric `t` and `value`")
            })?;
        if let Some(prev) = samples.last() {
            if sample.t <= prev.t {
                return Err(TrackError::range(
                    &item_path.field("t"),
                    format!("t must be strictly increasing ({} after {})", sample.t, prev.t),
                ));
            }
        }
        samples.push(sample);
    }
    if samples[0].t != 0.0 {
        return Err(TrackError::range(&path.index(0).field("t"), "first sample must have t = 0"));
    }
    let last = samples.len() - 1;
    if samples[last].t != 1.0 {
        return Err(TrackError::range(
            &path.index(last).field("t"),
            "last sample must have t = 1",
        ));
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    fn merge(parent: &Settings, overrides: Value) -> Result<Settings, TrackError> {
        let map = overrides.as_object().cloned().unwrap_or_default();
        merge_settings(parent, &map, &FieldPath::root("track"))
    }

    #[test]
    fn merge_substitutes_recognized_keys() {
        let parent = Settings::default();
        let merged = merge(&parent, json!({"trackWidth": 12, "debug": true})).unwrap();
        assert_eq!(merged.track_width, 12.0);
        assert!(merged.debug);
        assert_eq!(merged.precision, parent.precision);
        // parent untouched
        assert_eq!(parent.track_width, DEFAULT_TRACK_WIDTH);
    }

    #[test]
    fn merge_ignores_unrecognized_and_null() {
        let merged = merge(
            &Settings::default(),
            json!({"color": "red", "precision": null, "segments": []}),
        )
        .unwrap();
        assert_eq!(merged, Settings::default());
    }

    #[test]
    fn merge_rejects_non_positive_width() {
        let err = merge(&Settings::default(), json!({"trackWidth": 0})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(err.to_string().contains("track.trackWidth"));
    }

    #[test]
    fn merge_rejects_wrong_type() {
        let err = merge(&Settings::default(), json!({"debug": "yes"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = merge(&Settings::default(), json!({"debugLabel": 3})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn bank_angle_is_normalized() {
        let merged = merge(&Settings::default(), json!({"trackBank": 270})).unwrap();
        assert_eq!(merged.track_bank, Bank::Angle(-90.0));
    }

    #[test]
    fn bank_vector_accepted() {
        let merged = merge(&Settings::default(), json!({"trackBank": [0, -1, 1]})).unwrap();
        assert_eq!(merged.track_bank, Bank::Vector(DVec3::new(0.0, -1.0, 1.0)));
        let err = merge(&Settings::default(), json!({"trackBank": [0, 0, 0]})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn bank_schedule_interpolates() {
        let bank = validate_bank(
            &json!([{"t": 0, "v": 10}, {"t": 1, "v": 20}]),
            &FieldPath::root("bank"),
        )
        .unwrap();
        assert_eq!(bank.angle_at(0.5), Some(15.0));
        assert_eq!(bank.angle_at(0.0), Some(10.0));
        assert_eq!(bank.angle_at(1.0), Some(20.0));
    }

    #[test]
    fn bank_schedule_piecewise() {
        let bank = validate_bank(
            &json!([
                {"t": 0, "value": 0},
                {"t": 0.25, "value": 40},
                {"t": 1, "value": -20}
            ]),
            &FieldPath::root("bank"),
        )
        .unwrap();
        assert_eq!(bank.angle_at(0.125), Some(20.0));
        assert_eq!(bank.angle_at(0.625), Some(10.0));
        assert_eq!(bank.scaled(-1.0).angle_at(0.25), Some(-40.0));
    }

    #[test]
    fn bank_schedule_rejections_are_range_errors() {
        let path = FieldPath::root("bank");
        let cases = [
            json!([{"t": 0, "value": 1}]),
            json!([{"t": 0.1, "value": 1}, {"t": 1, "value": 2}]),
            json!([{"t": 0, "value": 1}, {"t": 0.9, "value": 2}]),
            json!([{"t": 0, "value": 1}, {"t": 0, "value": 2}, {"t": 1, "value": 2}]),
            json!([{"t": 0, "value": "a"}, {"t": 1, "value": 2}]),
            json!([{"t": 0, "value": 1}, 5]),
        ];
        for case in cases {
            let err = validate_bank(&case, &path).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Range, "{case}");
        }
    }

    #[test]
    fn bank_rejects_strings() {
        let err = validate_bank(&json!("steep"), &FieldPath::root("bank")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn settings_from_json_validates() {
        let settings = Settings::from_json(&json!({"precision": 0.01, "debugLabel": "demo"})).unwrap();
        assert_eq!(settings.precision, 0.01);
        assert_eq!(settings.debug_label.as_deref(), Some("demo"));

        let err = Settings::from_json(&json!({"precision": -1})).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"value out of range at `settings.precision`: expected a positive number, got -1");
        assert!(Settings::from_json(&json!([])).is_err());
    }

    #[test]
    fn is_setting_key_matches_registry() {
        assert!(is_setting_key("wallHeight"));
        assert!(!is_setting_key("medianWidth"));
    }
}
