//! Settings schema and validation (spec §4.2).
//!
//! Each game module publishes a list of [`SettingDefinition`]s. Validation
//! walks them independently of the concrete settings struct so that a
//! `PartialGameSettings`-shaped JSON blob arriving from the transport can be
//! coerced into something safe before a reducer ever sees it.

use serde_json::{Map, Value};

/// The coercion rule applied to one setting's raw input value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SettingType {
    Boolean,
    Number,
    NullableNumber,
    Select,
}

/// One entry in a game module's settings schema.
#[derive(Clone, Debug)]
pub struct SettingDefinition {
    pub key: &'static str,
    pub setting_type: SettingType,
    pub default: Value,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub options: Option<&'static [&'static str]>,
    /// If set, this setting is forced to its default unless another setting
    /// (`key`) currently equals `value`.
    pub depends_on: Option<(&'static str, Value)>,
    /// `Number`-typed settings backed by an `i64` field (rather than `f64`)
    /// set this so validation emits a JSON integer instead of a float —
    /// `serde_json::from_value::<i64>` rejects `Value::Number` floats.
    pub integer: bool,
}

impl SettingDefinition {
    #[must_use]
    pub const fn boolean(key: &'static str, default: bool) -> Self {
        Self {
            key,
            setting_type: SettingType::Boolean,
            default: Value::Bool(default),
            min: None,
            max: None,
            step: None,
            options: None,
            depends_on: None,
            integer: false,
        }
    }

    #[must_use]
    pub fn number(key: &'static str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            key,
            setting_type: SettingType::Number,
            default: serde_json::json!(default),
            min: Some(min),
            max: Some(max),
            step: Some(step),
            options: None,
            depends_on: None,
            integer: false,
        }
    }

    /// Like [`Self::number`], but for settings backed by an `i64` field:
    /// `default`/`min`/`max`/`step` are still expressed as `f64` (so the
    /// clamp/snap math in `validate` stays uniform), but the validated
    /// output is always emitted as a JSON integer.
    #[must_use]
    pub fn integer(key: &'static str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            integer: true,
            default: serde_json::json!(default as i64),
            ..Self::number(key, default, min, max, step)
        }
    }

    #[must_use]
    pub fn nullable_number(key: &'static str, default: Option<f64>, min: f64, max: f64) -> Self {
        Self {
            key,
            setting_type: SettingType::NullableNumber,
            default: default.map_or(Value::Null, |d| serde_json::json!(d)),
            min: Some(min),
            max: Some(max),
            step: None,
            options: None,
            depends_on: None,
            integer: false,
        }
    }

    #[must_use]
    pub fn select(key: &'static str, default: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            key,
            setting_type: SettingType::Select,
            default: Value::String(default.to_string()),
            min: None,
            max: None,
            step: None,
            options: Some(options),
            depends_on: None,
            integer: false,
        }
    }

    #[must_use]
    pub const fn depends_on(mut self, key: &'static str, value: Value) -> Self {
        self.depends_on = Some((key, value));
        self
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        Value::Number(n) if n.as_i64() == Some(0) => Some(false),
        Value::Number(n) if n.as_i64() == Some(1) => Some(true),
        _ => None,
    }
}

fn clamp_and_snap(raw: f64, min: f64, max: f64, step: f64) -> f64 {
    let clamped = raw.clamp(min, max);
    if step <= 0.0 {
        return clamped;
    }
    let steps = ((clamped - min) / step).round();
    (min + steps * step).clamp(min, max)
}

/// Validate a raw JSON settings object against `definitions`, returning a
/// fully-populated, coerced settings object. Unknown keys in `raw` are
/// dropped; missing keys get their definition's default.
#[must_use]
pub fn validate(definitions: &[SettingDefinition], raw: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();

    for def in definitions {
        if let Some((dep_key, dep_value)) = &def.depends_on {
            let dep_satisfied = out.get(dep_key).map(|v| v == dep_value).unwrap_or(false);
            if !dep_satisfied {
                out.insert(def.key.to_string(), def.default.clone());
                continue;
            }
        }

        let input = raw.get(def.key);
        let value = match def.setting_type {
            SettingType::Boolean => input
                .and_then(coerce_bool)
                .map(Value::Bool)
                .unwrap_or_else(|| def.default.clone()),
            SettingType::Number => match input.and_then(Value::as_f64) {
                Some(n) => {
                    let (min, max, step) = (
                        def.min.unwrap_or(f64::MIN),
                        def.max.unwrap_or(f64::MAX),
                        def.step.unwrap_or(0.0),
                    );
                    let snapped = clamp_and_snap(n, min, max, step);
                    if def.integer {
                        serde_json::json!(snapped.round() as i64)
                    } else {
                        serde_json::json!(snapped)
                    }
                }
                None => def.default.clone(),
            },
            SettingType::NullableNumber => match input {
                None => def.default.clone(),
                Some(Value::Null) => Value::Null,
                Some(v) => match v.as_f64() {
                    Some(n) => {
                        let (min, max) = (def.min.unwrap_or(f64::MIN), def.max.unwrap_or(f64::MAX));
                        serde_json::json!(n.clamp(min, max))
                    }
                    None => def.default.clone(),
                },
            },
            SettingType::Select => match input.and_then(Value::as_str) {
                Some(s) if def.options.is_some_and(|opts| opts.contains(&s)) => {
                    Value::String(s.to_string())
                }
                _ => def.default.clone(),
            },
        };

        out.insert(def.key.to_string(), value);
    }

    out
}
