//! Profile CRUD, activation, and merge-precedence updates.
use serde_json::Value;

use crate::constants::{
    ACTIVE_MODULE_PROFILE, DEFAULT_PROFILE_NAME, MODULE_NAME, MODULE_PROFILES,
    NOTIFICATION_PREFIX,
};
use crate::error::ProfileError;
use crate::notify::{LogNotifier, NotificationLevel};
use crate::profile::{Profile, ProfileCollection, resolve_profile};
use crate::recovery::{RecoveryMultiplier, RoundingMethod};
use crate::schema::SettingsSchema;
use crate::{Notifier, SettingsStore};

/// Reads and writes profiles through an injected settings store.
///
/// Nothing is cached: every query re-reads the store and every update is
/// written back before the call returns.
pub struct ProfileManager<S, N = LogNotifier>
where
    S: SettingsStore,
    N: Notifier,
{
    store: S,
    notifier: N,
    schema: SettingsSchema,
    namespace: String,
}

impl<S> ProfileManager<S, LogNotifier>
where
    S: SettingsStore,
{
    /// Manager over the built-in schema that reports problems through `log`.
    pub fn with_store(store: S) -> Self {
        Self::new(store, LogNotifier, SettingsSchema::builtin())
    }
}

impl<S, N> ProfileManager<S, N>
where
    S: SettingsStore,
    N: Notifier,
{
    pub fn new(store: S, notifier: N, schema: SettingsSchema) -> Self {
        Self {
            store,
            notifier,
            schema,
            namespace: MODULE_NAME.to_string(),
        }
    }

    /// Override the store namespace (defaults to [`MODULE_NAME`]).
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn schema(&self) -> &SettingsSchema {
        &self.schema
    }

    /// Names of every stored profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or decoded.
    pub fn list_profile_names(&self) -> Result<Vec<String>, ProfileError> {
        Ok(self.all_profiles()?.into_keys().collect())
    }

    /// The stored collection as persisted; empty when nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the stored value is not an
    /// object of profile objects.
    pub fn all_profiles(&self) -> Result<ProfileCollection, ProfileError> {
        match self.read(MODULE_PROFILES)? {
            None => Ok(ProfileCollection::new()),
            Some(raw) => {
                serde_json::from_value(raw).map_err(|source| ProfileError::MalformedSetting {
                    key: MODULE_PROFILES.to_string(),
                    source,
                })
            }
        }
    }

    /// Stored data for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ProfileNotFound`] (after notifying the user)
    /// when no profile of that name exists.
    pub fn profile(&self, name: &str) -> Result<Profile, ProfileError> {
        let mut profiles = self.all_profiles()?;
        profiles.remove(name).ok_or_else(|| self.not_found(name))
    }

    /// The active-profile pointer as stored, without an existence check.
    /// An unset pointer reads as an empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the pointer is not a string.
    pub fn active_profile_name(&self) -> Result<String, ProfileError> {
        match self.read(ACTIVE_MODULE_PROFILE)? {
            None => Ok(String::new()),
            Some(raw) => {
                serde_json::from_value(raw).map_err(|source| ProfileError::MalformedSetting {
                    key: ACTIVE_MODULE_PROFILE.to_string(),
                    source,
                })
            }
        }
    }

    /// Stored data for the active profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ProfileNotFound`] when the pointer is stale.
    pub fn active_profile(&self) -> Result<Profile, ProfileError> {
        let name = self.active_profile_name()?;
        self.profile(&name)
    }

    /// Point the active profile at `name` and project its values onto the
    /// live settings, filling gaps from schema defaults.
    ///
    /// The pointer is written first and each live setting after it, one at a
    /// time. A failure part way leaves the remaining settings stale; calling
    /// again re-derives the same values.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ProfileNotFound`] if `name` does not exist
    /// (the pointer has already been written by then), or a store error.
    pub async fn set_active_profile(&self, name: &str) -> Result<Profile, ProfileError> {
        self.write(ACTIVE_MODULE_PROFILE, Value::String(name.to_string()))
            .await?;
        let profile = self.profile(name)?;
        for (key, default) in self.schema.iter() {
            let value = profile.get(key).unwrap_or(default).clone();
            self.write(key, value).await?;
        }
        log::info!(
            "activated profile \"{name}\" across {} settings",
            self.schema.len()
        );
        Ok(profile)
    }

    /// Apply partial updates to several existing profiles in one write.
    ///
    /// Each named profile is rebuilt key by key from its patch, its stored
    /// values, and the schema defaults. Profiles not named in `patches` are
    /// kept as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ProfileNotFound`] before writing anything if
    /// any named profile does not exist.
    pub async fn update_profiles(&self, patches: &ProfileCollection) -> Result<(), ProfileError> {
        let mut profiles = self.all_profiles()?;
        let mut resolved = Vec::with_capacity(patches.len());
        for (name, patch) in patches {
            let stored = profiles.get(name).ok_or_else(|| self.not_found(name))?;
            resolved.push((
                name.clone(),
                resolve_profile(&self.schema, Some(patch), Some(stored)),
            ));
        }
        profiles.extend(resolved);
        self.write_profiles(&profiles).await
    }

    /// Apply a partial update to one existing profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ProfileNotFound`] without writing if `name`
    /// does not exist.
    pub async fn update_profile(&self, name: &str, patch: &Profile) -> Result<(), ProfileError> {
        let mut profiles = self.all_profiles()?;
        let stored = profiles.get(name).ok_or_else(|| self.not_found(name))?;
        let resolved = resolve_profile(&self.schema, Some(patch), Some(stored));
        profiles.insert(name.to_string(), resolved);
        self.write_profiles(&profiles).await
    }

    /// Add a new profile resolved from `patch` and the schema defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidProfileName`] for a blank name and
    /// [`ProfileError::ProfileExists`] if the name is taken.
    pub async fn create_profile(&self, name: &str, patch: &Profile) -> Result<Profile, ProfileError> {
        if name.trim().is_empty() {
            return Err(ProfileError::InvalidProfileName);
        }
        let mut profiles = self.all_profiles()?;
        if profiles.contains_key(name) {
            return Err(ProfileError::ProfileExists {
                name: name.to_string(),
            });
        }
        let profile = resolve_profile(&self.schema, Some(patch), None);
        profiles.insert(name.to_string(), profile.clone());
        self.write_profiles(&profiles).await?;
        Ok(profile)
    }

    /// Seed the default profile and the active pointer on a fresh store.
    ///
    /// Returns `true` when anything was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub async fn initialize(&self) -> Result<bool, ProfileError> {
        let mut wrote = false;
        let mut profiles = self.all_profiles()?;
        if profiles.is_empty() {
            profiles.insert(
                DEFAULT_PROFILE_NAME.to_string(),
                resolve_profile(&self.schema, None, None),
            );
            self.write_profiles(&profiles).await?;
            wrote = true;
        }
        if self.active_profile_name()?.trim().is_empty()
            && profiles.contains_key(DEFAULT_PROFILE_NAME)
        {
            self.set_active_profile(DEFAULT_PROFILE_NAME).await?;
            wrote = true;
        }
        Ok(wrote)
    }

    /// Live value of a setting, falling back to its schema default when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn setting(&self, key: &str) -> Result<Value, ProfileError> {
        Ok(self
            .read(key)?
            .or_else(|| self.schema.default_for(key).cloned())
            .unwrap_or(Value::Null))
    }

    /// Decode the live recovery-multiplier setting `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SettingParse`] for unrecognised values.
    pub fn recovery_multiplier(&self, key: &str) -> Result<RecoveryMultiplier, ProfileError> {
        RecoveryMultiplier::from_setting(key, &self.setting(key)?)
    }

    /// Decode the live rounding setting `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SettingParse`] for unrecognised values.
    pub fn rounding_method(&self, key: &str) -> Result<RoundingMethod, ProfileError> {
        RoundingMethod::from_setting(key, &self.setting(key)?)
    }

    fn not_found(&self, name: &str) -> ProfileError {
        log::warn!("profile \"{name}\" requested but not stored");
        self.notifier.notify(
            NotificationLevel::Error,
            &format!("{NOTIFICATION_PREFIX} | Profile \"{name}\" does not exist"),
        );
        ProfileError::ProfileNotFound {
            name: name.to_string(),
        }
    }

    fn read(&self, key: &str) -> Result<Option<Value>, ProfileError> {
        self.store
            .get(&self.namespace, key)
            .map(|value| value.filter(|v| !v.is_null()))
            .map_err(|source| ProfileError::store(key, source))
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), ProfileError> {
        log::debug!("writing setting {}.{key}", self.namespace);
        self.store
            .set(&self.namespace, key, value)
            .await
            .map_err(|source| ProfileError::store(key, source))
    }

    async fn write_profiles(&self, profiles: &ProfileCollection) -> Result<(), ProfileError> {
        let value =
            serde_json::to_value(profiles).map_err(|source| ProfileError::MalformedSetting {
                key: MODULE_PROFILES.to_string(),
                source,
            })?;
        self.write(MODULE_PROFILES, value).await
    }
}
