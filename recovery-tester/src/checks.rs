//! Behavioural checks run against a fresh in-memory store.
use std::time::{Duration, Instant};

use anyhow::{Result, bail, ensure};
use async_trait::async_trait;
use recovery_profiles::constants::{
    ACTIVE_MODULE_PROFILE, DEFAULT_PROFILE_NAME, HIT_DICE_ROUNDING, LONG_REST_HIT_DICE_RECOVERY,
    MODULE_NAME,
};
use recovery_profiles::{
    ConsumableEntity, ConsumableValues, EntityKind, FlagPatch, MemorySettingsStore, Profile,
    ProfileCollection, ProfileError, ProfileManager, RecordingNotifier, SettingsSchema,
    SettingsStore, set_consumable_values,
};
use serde::Serialize;
use serde_json::json;

type Manager = ProfileManager<MemorySettingsStore, RecordingNotifier>;

const CHECKS: &[(&str, &str)] = &[
    ("fallback-precedence", "Patched values win over stored values and defaults"),
    ("independent-keys", "Empty patches keep stored values and only fill gaps"),
    ("activation-projection", "Activation writes every live setting"),
    ("activation-idempotent", "Activating twice yields identical live settings"),
    ("missing-profile", "Unknown profiles fail with no writes"),
    ("bulk-round-trip", "Bulk updates resolve against the prior profile"),
    ("consumable-validation", "Invalid consumables never reach the entity"),
    ("setting-helpers", "Multiplier and rounding settings decode"),
];

/// Outcome of one check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub duration: Duration,
    pub failure: Option<String>,
}

pub fn list_checks() -> &'static [(&'static str, &'static str)] {
    CHECKS
}

/// Expand a comma-separated selection; `all` selects every check.
pub fn expand_selection(selection: &str) -> Vec<String> {
    let mut names: Vec<String> = selection
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();
    if names.iter().any(|name| name == "all") {
        names = CHECKS.iter().map(|(name, _)| (*name).to_string()).collect();
    }
    names
}

pub async fn run_checks(names: &[String]) -> Vec<CheckResult> {
    let mut results = Vec::with_capacity(names.len());
    for name in names {
        let start = Instant::now();
        let outcome = run_check(name).await;
        if let Err(e) = &outcome {
            log::debug!("check {name} failed: {e:#}");
        }
        results.push(CheckResult {
            name: name.clone(),
            passed: outcome.is_ok(),
            duration: start.elapsed(),
            failure: outcome.err().map(|e| format!("{e:#}")),
        });
    }
    results
}

async fn run_check(name: &str) -> Result<()> {
    match name {
        "fallback-precedence" => fallback_precedence().await,
        "independent-keys" => independent_keys().await,
        "activation-projection" => activation_projection().await,
        "activation-idempotent" => activation_idempotent().await,
        "missing-profile" => missing_profile().await,
        "bulk-round-trip" => bulk_round_trip().await,
        "consumable-validation" => consumable_validation().await,
        "setting-helpers" => setting_helpers().await,
        other => bail!("unknown check \"{other}\""),
    }
}

async fn fresh_manager() -> Result<Manager> {
    let manager = ProfileManager::new(
        MemorySettingsStore::new(),
        RecordingNotifier::new(),
        SettingsSchema::builtin(),
    );
    manager.initialize().await?;
    manager
        .create_profile(
            "Gritty",
            &Profile::new().with(LONG_REST_HIT_DICE_RECOVERY, json!("quarter")),
        )
        .await?;
    manager.store().clear_writes();
    Ok(manager)
}

async fn fallback_precedence() -> Result<()> {
    let manager = fresh_manager().await?;
    let keys: Vec<String> = manager.schema().keys().map(ToString::to_string).collect();
    for key in keys {
        let marker = json!(format!("marker-{key}"));
        manager
            .update_profile("Gritty", &Profile::new().with(key.clone(), marker.clone()))
            .await?;
        let stored = manager.profile("Gritty")?;
        ensure!(stored.get(&key) == Some(&marker), "{key} was not updated");
    }
    Ok(())
}

async fn independent_keys() -> Result<()> {
    let manager = fresh_manager().await?;
    let before = manager.profile("Gritty")?;
    manager.update_profile("Gritty", &Profile::new()).await?;
    let after = manager.profile("Gritty")?;
    ensure!(before == after, "empty patch changed the profile");
    ensure!(
        after.get(LONG_REST_HIT_DICE_RECOVERY) == Some(&json!("quarter")),
        "stored override was reset to its default"
    );
    Ok(())
}

async fn activation_projection() -> Result<()> {
    let manager = fresh_manager().await?;
    let profile = manager.set_active_profile("Gritty").await?;
    for (key, default) in manager.schema().iter() {
        let expected = profile.get(key).unwrap_or(default);
        let live = manager.store().get(MODULE_NAME, key)?;
        ensure!(
            live.as_ref() == Some(expected),
            "live setting {key} is {live:?}, expected {expected}"
        );
    }
    let writes = manager.store().writes();
    ensure!(
        writes.first().map(|w| w.key.as_str()) == Some(ACTIVE_MODULE_PROFILE),
        "active pointer was not written first"
    );
    Ok(())
}

async fn activation_idempotent() -> Result<()> {
    let manager = fresh_manager().await?;
    manager.set_active_profile("Gritty").await?;
    let first = manager.store().snapshot();
    manager.set_active_profile("Gritty").await?;
    ensure!(
        manager.store().snapshot() == first,
        "second activation changed settings"
    );
    Ok(())
}

async fn missing_profile() -> Result<()> {
    let manager = fresh_manager().await?;
    ensure!(
        matches!(
            manager.profile("nonexistent"),
            Err(ProfileError::ProfileNotFound { .. })
        ),
        "lookup of an unknown profile did not fail"
    );
    let update = manager
        .update_profile("nonexistent", &Profile::new().with(HIT_DICE_ROUNDING, json!("up")))
        .await;
    ensure!(
        update.as_ref().is_err_and(ProfileError::is_not_found),
        "update of an unknown profile did not fail"
    );
    ensure!(
        manager.store().writes().is_empty(),
        "failed calls wrote settings"
    );
    ensure!(
        manager.notifier().notifications().len() == 2,
        "each failure should notify the user once"
    );
    Ok(())
}

async fn bulk_round_trip() -> Result<()> {
    let manager = fresh_manager().await?;
    let mut patches = ProfileCollection::new();
    patches.insert(
        "Gritty".to_string(),
        Profile::new().with(HIT_DICE_ROUNDING, json!("round")),
    );
    manager.update_profiles(&patches).await?;
    let all = manager.all_profiles()?;
    let Some(gritty) = all.get("Gritty") else {
        bail!("Gritty vanished after bulk update");
    };
    ensure!(gritty.get(HIT_DICE_ROUNDING) == Some(&json!("round")));
    ensure!(gritty.get(LONG_REST_HIT_DICE_RECOVERY) == Some(&json!("quarter")));
    ensure!(
        all.contains_key(DEFAULT_PROFILE_NAME),
        "bulk update dropped an unrelated profile"
    );
    Ok(())
}

#[derive(Default)]
struct CountingActor {
    updates: Vec<FlagPatch>,
}

#[async_trait]
impl ConsumableEntity for CountingActor {
    type Updated = usize;
    type Error = std::convert::Infallible;

    fn kind(&self) -> EntityKind {
        EntityKind::Actor
    }

    async fn update(&mut self, patch: FlagPatch) -> Result<Self::Updated, Self::Error> {
        let written = patch.len();
        self.updates.push(patch);
        Ok(written)
    }
}

async fn consumable_validation() -> Result<()> {
    let mut actor = CountingActor::default();
    let negative = ConsumableValues {
        food: Some(-1.0),
        ..ConsumableValues::default()
    };
    ensure!(
        set_consumable_values(&mut actor, &negative).await.is_err(),
        "negative food was accepted"
    );
    ensure!(actor.updates.is_empty(), "invalid values reached the entity");

    let partial = ConsumableValues {
        food: Some(5.0),
        water: None,
        starvation: None,
    };
    let written = set_consumable_values(&mut actor, &partial).await?;
    ensure!(written == 1, "expected only the food flag, wrote {written}");
    Ok(())
}

async fn setting_helpers() -> Result<()> {
    let manager = fresh_manager().await?;
    manager.set_active_profile("Gritty").await?;
    let multiplier = manager.recovery_multiplier(LONG_REST_HIT_DICE_RECOVERY)?;
    let rounding = manager.rounding_method(HIT_DICE_ROUNDING)?;
    ensure!(
        recovery_profiles::recovered_amount(9, multiplier, rounding) == 2,
        "quarter of 9 rounded down should be 2"
    );
    manager
        .store()
        .set(MODULE_NAME, HIT_DICE_ROUNDING, json!("sideways"))
        .await?;
    ensure!(
        matches!(
            manager.rounding_method(HIT_DICE_ROUNDING),
            Err(ProfileError::SettingParse { .. })
        ),
        "unknown rounding mode decoded"
    );
    Ok(())
}
