//! Rest Recovery Profiles
//!
//! Platform-agnostic profile management for the Rest Recovery survival add-on.
//! Profiles bundle recovery settings that can be swapped as a unit, partially
//! overridden, and merged against a schema of defaults. Persistence, user
//! notifications, and the game entities being patched are supplied by the host
//! through the traits below.

pub mod constants;
pub mod consumables;
pub mod error;
pub mod manager;
pub mod memory;
pub mod notify;
pub mod numbers;
pub mod profile;
pub mod recovery;
pub mod schema;

// Re-export commonly used types
pub use consumables::{
    ConsumableEntity, ConsumableField, ConsumableValues, EntityKind, FlagPatch,
    set_consumable_values,
};
pub use error::{ProfileError, SettingKind};
pub use manager::ProfileManager;
pub use memory::{MemorySettingsStore, MemoryStoreError, SettingWrite};
pub use notify::{LogNotifier, NotificationLevel, RecordingNotifier};
pub use profile::{Profile, ProfileCollection, effective_value, resolve_profile};
pub use recovery::{RecoveryMultiplier, RoundingMethod, recovered_amount};
pub use schema::{SettingSpec, SettingsSchema};

use async_trait::async_trait;
use serde_json::Value;

/// Trait for abstracting the host's persistent settings.
/// Platform-specific implementations should provide this
#[async_trait]
pub trait SettingsStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a setting; `None` when nothing has been stored under the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, Self::Error>;

    /// Durably write a setting. Each key is written atomically on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), Self::Error>;
}

/// Trait for surfacing problems to the end user (toasts, banners, logs).
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);
}

#[async_trait]
impl<T> SettingsStore for std::sync::Arc<T>
where
    T: SettingsStore,
{
    type Error = T::Error;

    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, Self::Error> {
        (**self).get(namespace, key)
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), Self::Error> {
        (**self).set(namespace, key, value).await
    }
}
