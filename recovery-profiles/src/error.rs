//! Error kinds raised by profile and consumable operations.
use std::fmt;

use thiserror::Error;

use crate::consumables::ConsumableField;

/// Boxed failure coming from a host collaborator (settings store or entity).
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Enumerated setting families decoded by the recovery helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    RecoveryMultiplier,
    Rounding,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecoveryMultiplier => f.write_str("recovery multiplier"),
            Self::Rounding => f.write_str("rounding"),
        }
    }
}

/// Errors raised by the profile manager and the consumable updater.
///
/// None of these are transient; callers should surface them rather than retry.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile \"{name}\" does not exist")]
    ProfileNotFound { name: String },
    #[error("profile \"{name}\" already exists")]
    ProfileExists { name: String },
    #[error("profile name must not be blank")]
    InvalidProfileName,
    #[error("{field} must be of type number greater or equal than 0 (got {value})")]
    Validation {
        field: ConsumableField,
        value: String,
    },
    #[error("entity must be of kind {expected} (got {found})")]
    TypeMismatch { expected: String, found: String },
    #[error("unable to parse {kind} setting for \"{key}\" (got {value})")]
    SettingParse {
        key: String,
        kind: SettingKind,
        value: String,
    },
    #[error("stored setting \"{key}\" is malformed")]
    MalformedSetting {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("settings store failed for \"{key}\"")]
    Store {
        key: String,
        #[source]
        source: BoxedSource,
    },
    #[error("entity update failed")]
    Entity {
        #[source]
        source: BoxedSource,
    },
}

impl ProfileError {
    pub(crate) fn store<E>(key: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store {
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    /// True for the error kind raised when a named profile is absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ProfileNotFound { .. })
    }
}
