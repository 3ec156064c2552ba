//! Food, water, and starvation levels stored as flags on an actor.
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::constants::{FLAG_SATED_FOOD, FLAG_SATED_WATER, FLAG_STARVATION};
use crate::error::ProfileError;
use crate::numbers::is_non_negative_real;

/// Flag path → value patch handed to [`ConsumableEntity::update`].
pub type FlagPatch = Map<String, Value>;

/// Consumable field tracked on an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumableField {
    Food,
    Water,
    Starvation,
}

impl ConsumableField {
    pub const ALL: [Self; 3] = [Self::Food, Self::Water, Self::Starvation];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Water => "water",
            Self::Starvation => "starvation",
        }
    }

    /// Flag path the value is written to on the entity.
    #[must_use]
    pub const fn flag_key(self) -> &'static str {
        match self {
            Self::Food => FLAG_SATED_FOOD,
            Self::Water => FLAG_SATED_WATER,
            Self::Starvation => FLAG_STARVATION,
        }
    }
}

impl fmt::Display for ConsumableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Document class of a host entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Actor,
    Item,
    Other(String),
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actor => f.write_str("Actor"),
            Self::Item => f.write_str("Item"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Host entity whose consumable flags can be patched.
#[async_trait]
pub trait ConsumableEntity: Send {
    type Updated: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    fn kind(&self) -> EntityKind;

    /// Apply `patch` in a single host update.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects or fails the update.
    async fn update(&mut self, patch: FlagPatch) -> Result<Self::Updated, Self::Error>;
}

/// Requested consumable levels. `None` leaves the flag untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsumableValues {
    #[serde(default)]
    pub food: Option<f64>,
    #[serde(default)]
    pub water: Option<f64>,
    #[serde(default)]
    pub starvation: Option<f64>,
}

impl ConsumableValues {
    #[must_use]
    pub const fn get(&self, field: ConsumableField) -> Option<f64> {
        match field {
            ConsumableField::Food => self.food,
            ConsumableField::Water => self.water,
            ConsumableField::Starvation => self.starvation,
        }
    }

    /// Read values from an untyped host payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Validation`] when a field is present, not
    /// `null`, and not a number.
    pub fn from_json(payload: &Map<String, Value>) -> Result<Self, ProfileError> {
        let mut values = Self::default();
        for field in ConsumableField::ALL {
            let parsed = match payload.get(field.label()) {
                None | Some(Value::Null) => None,
                Some(Value::Number(number)) => number.as_f64(),
                Some(other) => {
                    return Err(ProfileError::Validation {
                        field,
                        value: other.to_string(),
                    });
                }
            };
            match field {
                ConsumableField::Food => values.food = parsed,
                ConsumableField::Water => values.water = parsed,
                ConsumableField::Starvation => values.starvation = parsed,
            }
        }
        Ok(values)
    }

    /// Validate every supplied field and build the flag patch.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Validation`] for the first supplied value that
    /// is not a finite number greater than or equal to zero.
    pub fn to_patch(&self) -> Result<FlagPatch, ProfileError> {
        let mut patch = FlagPatch::new();
        for field in ConsumableField::ALL {
            let Some(value) = self.get(field) else {
                continue;
            };
            let number = Some(value)
                .filter(|v| is_non_negative_real(*v))
                .and_then(Number::from_f64)
                .ok_or_else(|| ProfileError::Validation {
                    field,
                    value: value.to_string(),
                })?;
            patch.insert(field.flag_key().to_string(), Value::Number(number));
        }
        Ok(patch)
    }
}

/// Set the food, water, and/or starvation levels of an actor.
///
/// All supplied values are validated before the entity is touched, so an
/// invalid field means no update call at all.
///
/// # Errors
///
/// Returns [`ProfileError::TypeMismatch`] when `entity` is not an actor,
/// [`ProfileError::Validation`] for an invalid value, and
/// [`ProfileError::Entity`] when the host update fails.
pub async fn set_consumable_values<E>(
    entity: &mut E,
    values: &ConsumableValues,
) -> Result<E::Updated, ProfileError>
where
    E: ConsumableEntity,
{
    let kind = entity.kind();
    if kind != EntityKind::Actor {
        return Err(ProfileError::TypeMismatch {
            expected: EntityKind::Actor.to_string(),
            found: kind.to_string(),
        });
    }
    let patch = values.to_patch()?;
    log::debug!("updating consumable flags: {:?}", patch.keys().collect::<Vec<_>>());
    entity
        .update(patch)
        .await
        .map_err(|source| ProfileError::Entity {
            source: Box::new(source),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_skips_unsupplied_fields() {
        let values = ConsumableValues {
            food: Some(5.0),
            water: None,
            starvation: Some(0.0),
        };
        let patch = values.to_patch().unwrap();
        assert_eq!(patch.len(), 2);
        assert_eq!(patch.get(FLAG_SATED_FOOD), Some(&json!(5.0)));
        assert_eq!(patch.get(FLAG_STARVATION), Some(&json!(0.0)));
        assert!(!patch.contains_key(FLAG_SATED_WATER));
    }

    #[test]
    fn patch_rejects_negative_and_non_finite() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let values = ConsumableValues {
                water: Some(bad),
                ..ConsumableValues::default()
            };
            let err = values.to_patch().unwrap_err();
            assert!(matches!(
                err,
                ProfileError::Validation {
                    field: ConsumableField::Water,
                    ..
                }
            ));
        }
    }

    #[test]
    fn json_payload_accepts_numbers_and_nulls() {
        let payload = json!({ "food": 2, "water": null, "unrelated": "x" });
        let values = ConsumableValues::from_json(payload.as_object().unwrap()).unwrap();
        assert_eq!(values.food, Some(2.0));
        assert_eq!(values.water, None);
        assert_eq!(values.starvation, None);
    }

    #[test]
    fn json_payload_rejects_non_numeric_fields() {
        let payload = json!({ "starvation": "3" });
        let err = ConsumableValues::from_json(payload.as_object().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::Validation {
                field: ConsumableField::Starvation,
                ..
            }
        ));
    }
}
