use std::convert::Infallible;

use async_trait::async_trait;
use recovery_profiles::constants::{FLAG_SATED_FOOD, FLAG_SATED_WATER, FLAG_STARVATION};
use recovery_profiles::{
    ConsumableEntity, ConsumableField, ConsumableValues, EntityKind, FlagPatch, ProfileError,
    set_consumable_values,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug)]
struct FakeActor {
    kind: EntityKind,
    flags: FlagPatch,
    updates: Vec<FlagPatch>,
}

impl FakeActor {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            flags: FlagPatch::new(),
            updates: Vec::new(),
        }
    }
}

#[async_trait]
impl ConsumableEntity for FakeActor {
    type Updated = FlagPatch;
    type Error = Infallible;

    fn kind(&self) -> EntityKind {
        self.kind.clone()
    }

    async fn update(&mut self, patch: FlagPatch) -> Result<Self::Updated, Self::Error> {
        self.updates.push(patch.clone());
        self.flags.extend(patch);
        Ok(self.flags.clone())
    }
}

#[derive(Debug, Error)]
#[error("document is locked")]
struct Locked;

struct LockedActor;

#[async_trait]
impl ConsumableEntity for LockedActor {
    type Updated = ();
    type Error = Locked;

    fn kind(&self) -> EntityKind {
        EntityKind::Actor
    }

    async fn update(&mut self, _patch: FlagPatch) -> Result<Self::Updated, Self::Error> {
        Err(Locked)
    }
}

#[tokio::test]
async fn only_supplied_fields_are_written() {
    let mut actor = FakeActor::new(EntityKind::Actor);
    actor.flags.insert(FLAG_SATED_WATER.to_string(), json!(3.0));

    let values = ConsumableValues {
        food: Some(5.0),
        water: None,
        starvation: None,
    };
    let flags = set_consumable_values(&mut actor, &values).await.unwrap();

    assert_eq!(actor.updates.len(), 1);
    assert_eq!(actor.updates[0].len(), 1);
    assert_eq!(flags.get(FLAG_SATED_FOOD), Some(&json!(5.0)));
    assert_eq!(flags.get(FLAG_SATED_WATER), Some(&json!(3.0)));
    assert!(!flags.contains_key(FLAG_STARVATION));
}

#[tokio::test]
async fn invalid_value_aborts_before_update() {
    let mut actor = FakeActor::new(EntityKind::Actor);
    let values = ConsumableValues {
        food: Some(2.0),
        water: Some(1.0),
        starvation: Some(-1.0),
    };
    let err = set_consumable_values(&mut actor, &values)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProfileError::Validation {
            field: ConsumableField::Starvation,
            ..
        }
    ));
    assert!(actor.updates.is_empty());

    let negative_food = ConsumableValues {
        food: Some(-1.0),
        ..ConsumableValues::default()
    };
    assert!(set_consumable_values(&mut actor, &negative_food).await.is_err());
    assert!(actor.updates.is_empty());
}

#[tokio::test]
async fn non_actor_entities_are_rejected() {
    let mut item = FakeActor::new(EntityKind::Item);
    let values = ConsumableValues {
        food: Some(1.0),
        ..ConsumableValues::default()
    };
    let err = set_consumable_values(&mut item, &values).await.unwrap_err();
    assert!(matches!(
        err,
        ProfileError::TypeMismatch { ref expected, ref found } if expected == "Actor" && found == "Item"
    ));
    assert!(item.updates.is_empty());
}

#[tokio::test]
async fn host_payloads_go_through_the_same_validation() {
    let mut actor = FakeActor::new(EntityKind::Actor);
    let payload = json!({ "food": 5, "water": null, "starvation": 2 });
    let values = ConsumableValues::from_json(payload.as_object().unwrap()).unwrap();
    set_consumable_values(&mut actor, &values).await.unwrap();
    assert_eq!(actor.flags.get(FLAG_STARVATION), Some(&json!(2.0)));
    assert!(!actor.flags.contains_key(FLAG_SATED_WATER));
}

#[tokio::test]
async fn entity_failures_are_wrapped() {
    let values = ConsumableValues {
        water: Some(4.0),
        ..ConsumableValues::default()
    };
    let err = set_consumable_values(&mut LockedActor, &values)
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::Entity { .. }));
    assert_eq!(
        std::error::Error::source(&err).map(ToString::to_string),
        Some("document is locked".to_string())
    );
}
