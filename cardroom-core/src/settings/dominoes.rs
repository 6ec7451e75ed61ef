//! Dominoes settings: schema + validated struct.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::{SettingDefinition, validate};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DominoesSettings {
    pub win_target: i64,
    /// Accepted and validated, but the engine always passes when no legal
    /// tile is held — see `DESIGN.md` for the resolved open question.
    pub draw_from_boneyard: bool,
}

impl Default for DominoesSettings {
    fn default() -> Self {
        Self {
            win_target: 150,
            draw_from_boneyard: false,
        }
    }
}

#[must_use]
pub fn definitions() -> Vec<SettingDefinition> {
    vec![
        SettingDefinition::integer("win_target", 150.0, 50.0, 500.0, 25.0),
        SettingDefinition::boolean("draw_from_boneyard", false),
    ]
}

impl DominoesSettings {
    #[must_use]
    pub fn from_partial(raw: &Map<String, Value>) -> Self {
        let validated = validate(&definitions(), raw);
        serde_json::from_value(Value::Object(validated))
            .expect("validated map always matches DominoesSettings shape")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_validation() {
        let raw = Map::new();
        let settings = DominoesSettings::from_partial(&raw);
        assert_eq!(settings, DominoesSettings::default());
    }
}
