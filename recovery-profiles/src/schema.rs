//! Default-settings schema every profile resolves against.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_SETTINGS_DATA: &str = include_str!("../assets/default_settings.json");

/// Registration metadata for a single setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingSpec {
    #[serde(default)]
    pub default: Value,
}

/// Ordered set of setting keys and their defaults.
///
/// Iteration follows declaration order, which is also the order activation
/// projects values onto live settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsSchema {
    entries: Vec<(String, SettingSpec)>,
}

impl SettingsSchema {
    /// Schema shipped with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_json_or_empty(DEFAULT_SETTINGS_DATA)
    }

    /// Parse a bundled schema, logging and falling back to an empty schema
    /// when the data is malformed.
    fn from_json_or_empty(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(schema) => schema,
            Err(e) => {
                log::error!("built-in settings schema is malformed: {e}");
                Self::default()
            }
        }
    }

    /// Parse a schema from a JSON object of `key -> { "default": value }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not an object whose values are setting
    /// registrations.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: Map<String, Value> = serde_json::from_str(json)?;
        let mut entries = Vec::with_capacity(raw.len());
        for (key, spec) in raw {
            entries.push((key, serde_json::from_value(spec)?));
        }
        Ok(Self { entries })
    }

    /// Build a schema from `(key, default)` pairs, mostly for tests and hosts
    /// that register settings programmatically.
    #[must_use]
    pub fn from_defaults<I, K>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            entries: defaults
                .into_iter()
                .map(|(key, default)| (key.into(), SettingSpec { default }))
                .collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(key, spec)| (key.as_str(), &spec.default))
    }

    #[must_use]
    pub fn default_for(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, spec)| &spec.default)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.default_for(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FOOD_UNITS_PER_DAY, HIT_DICE_ROUNDING, LONG_REST_HIT_DICE_RECOVERY};
    use serde_json::json;

    #[test]
    fn malformed_bundled_schema_falls_back_to_empty() {
        assert!(SettingsSchema::from_json_or_empty("[1, 2]").is_empty());
        assert!(SettingsSchema::from_json_or_empty(r#"{ "k": 3 }"#).is_empty());
        let schema = SettingsSchema::from_json_or_empty(r#"{ "k": { "default": 3 } }"#);
        assert_eq!(schema.default_for("k"), Some(&json!(3)));
    }

    #[test]
    fn builtin_schema_parses_in_declaration_order() {
        let schema = SettingsSchema::builtin();
        assert!(!schema.is_empty());
        assert_eq!(
            schema.keys().next(),
            Some(crate::constants::LONG_REST_HIT_POINTS_RECOVERY)
        );
        assert_eq!(
            schema.default_for(LONG_REST_HIT_DICE_RECOVERY),
            Some(&json!("half"))
        );
        assert_eq!(schema.default_for(HIT_DICE_ROUNDING), Some(&json!("down")));
        assert_eq!(schema.default_for(FOOD_UNITS_PER_DAY), Some(&json!(1)));
        assert!(!schema.contains("not-a-setting"));
    }

    #[test]
    fn registrations_without_default_resolve_to_null() {
        let schema = SettingsSchema::from_json(r#"{ "a": { "default": 2 }, "b": {} }"#).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.default_for("b"), Some(&Value::Null));
    }

    #[test]
    fn rejects_non_object_registrations() {
        assert!(SettingsSchema::from_json(r#"{ "a": 3 }"#).is_err());
        assert!(SettingsSchema::from_json("[]").is_err());
    }
}
