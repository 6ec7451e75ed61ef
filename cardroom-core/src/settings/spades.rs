//! Spades settings: schema + validated struct.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::{SettingDefinition, validate};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SpadesSettings {
    pub allow_nil: bool,
    pub blind_bid_enabled: bool,
    pub blind_nil_enabled: bool,
    pub jokers_enabled: bool,
    pub deuce_of_spades_high: bool,
    pub win_target: i64,
    /// Stored as a negative number; the magnitude is deducted once a team's
    /// accumulated bags reach 10 (spec §9 "bag penalty sign ambiguity").
    pub bags_penalty: i64,
}

impl Default for SpadesSettings {
    fn default() -> Self {
        Self {
            allow_nil: true,
            blind_bid_enabled: true,
            blind_nil_enabled: true,
            jokers_enabled: false,
            deuce_of_spades_high: false,
            win_target: 500,
            bags_penalty: -100,
        }
    }
}

#[must_use]
pub fn definitions() -> Vec<SettingDefinition> {
    vec![
        SettingDefinition::boolean("allow_nil", true),
        SettingDefinition::boolean("blind_bid_enabled", true),
        SettingDefinition::boolean("blind_nil_enabled", true),
        SettingDefinition::boolean("jokers_enabled", false),
        SettingDefinition::boolean("deuce_of_spades_high", false),
        SettingDefinition::integer("win_target", 500.0, 100.0, 1000.0, 50.0),
        SettingDefinition::integer("bags_penalty", -100.0, -500.0, 0.0, 10.0),
    ]
}

impl SpadesSettings {
    /// Validate an arbitrary JSON blob (as would arrive from the
    /// transport) against the schema, filling defaults for anything
    /// missing or invalid, then deserialize into the concrete struct.
    #[must_use]
    pub fn from_partial(raw: &Map<String, Value>) -> Self {
        let validated = validate(&definitions(), raw);
        serde_json::from_value(Value::Object(validated))
            .expect("validated map always matches SpadesSettings shape")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_validation() {
        let raw = Map::new();
        let settings = SpadesSettings::from_partial(&raw);
        assert_eq!(settings, SpadesSettings::default());
    }

    #[test]
    fn bags_penalty_stays_negative() {
        let mut raw = Map::new();
        raw.insert("bags_penalty".to_string(), serde_json::json!(-250.0));
        let settings = SpadesSettings::from_partial(&raw);
        assert_eq!(settings.bags_penalty, -250);
    }
}
