//! Profile data and effective-value resolution.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::SettingsSchema;

/// Every stored profile keyed by its name.
pub type ProfileCollection = BTreeMap<String, Profile>;

/// Named, possibly partial set of setting overrides.
///
/// A `null` entry is treated exactly like a missing one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(Map<String, Value>);

impl Profile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used for patches.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Value for `key`, or `None` when absent or `null`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Profile {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Profile {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}

/// Effective value for one key: patch, then stored profile, then `default`.
#[must_use]
pub fn effective_value<'a>(
    key: &str,
    patch: Option<&'a Profile>,
    stored: Option<&'a Profile>,
    default: &'a Value,
) -> &'a Value {
    patch
        .and_then(|p| p.get(key))
        .or_else(|| stored.and_then(|s| s.get(key)))
        .unwrap_or(default)
}

/// Resolve a complete profile for every schema key, each key independently.
///
/// Keys outside the schema are not carried into the result.
#[must_use]
pub fn resolve_profile(
    schema: &SettingsSchema,
    patch: Option<&Profile>,
    stored: Option<&Profile>,
) -> Profile {
    schema
        .iter()
        .map(|(key, default)| (key, effective_value(key, patch, stored, default).clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> SettingsSchema {
        SettingsSchema::from_defaults([
            ("rounding", json!("down")),
            ("multiplier", json!("half")),
            ("food", json!(1)),
        ])
    }

    #[test]
    fn patch_beats_stored_beats_default() {
        let stored = Profile::new()
            .with("rounding", json!("up"))
            .with("multiplier", json!("full"));
        let patch = Profile::new().with("rounding", json!("round"));

        let resolved = resolve_profile(&schema(), Some(&patch), Some(&stored));
        assert_eq!(resolved.get("rounding"), Some(&json!("round")));
        assert_eq!(resolved.get("multiplier"), Some(&json!("full")));
        assert_eq!(resolved.get("food"), Some(&json!(1)));
    }

    #[test]
    fn null_entries_fall_through_to_next_tier() {
        let stored = Profile::new().with("food", json!(4));
        let patch = Profile::new()
            .with("food", Value::Null)
            .with("multiplier", Value::Null);

        let resolved = resolve_profile(&schema(), Some(&patch), Some(&stored));
        assert_eq!(resolved.get("food"), Some(&json!(4)));
        assert_eq!(resolved.get("multiplier"), Some(&json!("half")));
    }

    #[test]
    fn falsy_values_are_still_defined() {
        let patch = Profile::new().with("food", json!(0));
        let stored = Profile::new().with("food", json!(3));
        let resolved = resolve_profile(&schema(), Some(&patch), Some(&stored));
        assert_eq!(resolved.get("food"), Some(&json!(0)));
    }

    #[test]
    fn resolution_keeps_schema_keys_only() {
        let stored = Profile::new().with("retired-setting", json!(true));
        let resolved = resolve_profile(&schema(), None, Some(&stored));
        assert_eq!(resolved.len(), 3);
        assert!(resolved.get("retired-setting").is_none());
        let keys: Vec<&str> = resolved.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["rounding", "multiplier", "food"]);
    }

    #[test]
    fn profile_serializes_as_plain_object() {
        let profile = Profile::new().with("food", json!(2));
        assert_eq!(serde_json::to_value(&profile).unwrap(), json!({ "food": 2 }));
        let decoded: Profile = serde_json::from_value(json!({ "water": 1 })).unwrap();
        assert_eq!(decoded.get("water"), Some(&json!(1)));
    }
}
