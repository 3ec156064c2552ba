//! In-process settings store used by tests and the tester CLI.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::SettingsStore;

/// One durable write, in the order it reached the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingWrite {
    pub namespace: String,
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("write to \"{key}\" rejected")]
    Rejected { key: String },
    #[error("settings store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct Inner {
    values: BTreeMap<String, BTreeMap<String, Value>>,
    writes: Vec<SettingWrite>,
    rejected: BTreeSet<String>,
}

/// Map-backed [`SettingsStore`] that records every write.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    inner: Mutex<Inner>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a `{ namespace: { key: value } }` snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is not an object of objects.
    pub fn from_snapshot(snapshot: Value) -> Result<Self, serde_json::Error> {
        let values: BTreeMap<String, BTreeMap<String, Value>> = serde_json::from_value(snapshot)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                values,
                ..Inner::default()
            }),
        })
    }

    /// Current contents as a `{ namespace: { key: value } }` object.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let Ok(inner) = self.inner.lock() else {
            return Value::Object(Map::new());
        };
        serde_json::to_value(&inner.values).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Insert a value directly without recording a write.
    pub fn seed(&self, namespace: &str, key: &str, value: Value) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .values
                .entry(namespace.to_string())
                .or_default()
                .insert(key.to_string(), value);
        }
    }

    /// Writes recorded since construction or the last [`Self::clear_writes`].
    #[must_use]
    pub fn writes(&self) -> Vec<SettingWrite> {
        self.inner
            .lock()
            .map(|inner| inner.writes.clone())
            .unwrap_or_default()
    }

    pub fn clear_writes(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.writes.clear();
        }
    }

    /// Make every later write to `key` fail, simulating a host outage.
    pub fn reject_writes_to(&self, key: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.rejected.insert(key.to_string());
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    type Error = MemoryStoreError;

    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, Self::Error> {
        let inner = self.inner.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        Ok(inner
            .values
            .get(namespace)
            .and_then(|settings| settings.get(key))
            .cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), Self::Error> {
        let mut inner = self.inner.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        if inner.rejected.contains(key) {
            return Err(MemoryStoreError::Rejected {
                key: key.to_string(),
            });
        }
        inner.writes.push(SettingWrite {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value: value.clone(),
        });
        inner
            .values
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn writes_are_recorded_and_readable() {
        let store = MemorySettingsStore::new();
        store.set("ns", "a", json!(1)).await.unwrap();
        store.set("ns", "a", json!(2)).await.unwrap();
        assert_eq!(store.get("ns", "a").unwrap(), Some(json!(2)));
        assert_eq!(store.get("other", "a").unwrap(), None);
        assert_eq!(store.writes().len(), 2);
        store.clear_writes();
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn rejected_keys_fail_without_recording() {
        let store = MemorySettingsStore::new();
        store.reject_writes_to("a");
        let err = store.set("ns", "a", json!(1)).await.unwrap_err();
        assert_eq!(err, MemoryStoreError::Rejected { key: "a".into() });
        assert!(store.writes().is_empty());
        assert_eq!(store.get("ns", "a").unwrap(), None);
    }

    #[test]
    fn snapshot_round_trips_seeded_values() {
        let store = MemorySettingsStore::new();
        store.seed("ns", "a", json!({ "x": true }));
        let copy = MemorySettingsStore::from_snapshot(store.snapshot()).unwrap();
        assert_eq!(copy.get("ns", "a").unwrap(), Some(json!({ "x": true })));
        assert!(copy.writes().is_empty());
        assert!(MemorySettingsStore::from_snapshot(json!([1])).is_err());
    }
}
