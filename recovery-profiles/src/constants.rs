//! Storage keys and identifiers shared by the profile manager and its hosts.
//!
//! Setting keys are the wire names the host settings store uses, so changing
//! any of them orphans data already persisted under the old name.

/// Namespace every setting of the add-on is registered under.
pub const MODULE_NAME: &str = "rest-recovery";

/// Prefix used on user-facing notifications.
pub const NOTIFICATION_PREFIX: &str = "Rest Recovery";

/// Name of the profile seeded by [`crate::ProfileManager::initialize`].
pub const DEFAULT_PROFILE_NAME: &str = "Default";

// Profile bookkeeping -------------------------------------------------------
pub const MODULE_PROFILES: &str = "module-profiles";
pub const ACTIVE_MODULE_PROFILE: &str = "active-module-profile";

// Live settings shipped in the built-in schema ------------------------------
pub const LONG_REST_HIT_POINTS_RECOVERY: &str = "long-rest-hit-points-recovery";
pub const LONG_REST_HIT_DICE_RECOVERY: &str = "long-rest-hit-dice-recovery";
pub const LONG_REST_SPELL_SLOTS_RECOVERY: &str = "long-rest-spell-slots-recovery";
pub const LONG_REST_PACT_SLOTS_RECOVERY: &str = "long-rest-pact-slots-recovery";
pub const LONG_REST_FEATURE_USES_RECOVERY: &str = "long-rest-feature-uses-recovery";
pub const LONG_REST_ITEM_USES_RECOVERY: &str = "long-rest-item-uses-recovery";
pub const LONG_REST_DAY_ITEM_USES_RECOVERY: &str = "long-rest-day-item-uses-recovery";
pub const HIT_DICE_ROUNDING: &str = "hit-dice-rounding";
pub const HIT_POINTS_ROUNDING: &str = "hit-points-rounding";
pub const SPELL_SLOTS_ROUNDING: &str = "spell-slots-rounding";
pub const ENABLE_FOOD_AND_WATER: &str = "enable-food-and-water";
pub const FOOD_UNITS_PER_DAY: &str = "food-units-per-day";
pub const WATER_UNITS_PER_DAY: &str = "water-units-per-day";
pub const STARVATION_GRACE_DAYS: &str = "starvation-grace-days";
pub const AUTOMATE_EXHAUSTION: &str = "automate-exhaustion";

// Actor flags ---------------------------------------------------------------
pub const FLAG_SATED_FOOD: &str = "flags.rest-recovery.data.sated.food";
pub const FLAG_SATED_WATER: &str = "flags.rest-recovery.data.sated.water";
pub const FLAG_STARVATION: &str = "flags.rest-recovery.data.starvation";
