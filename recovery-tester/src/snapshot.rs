//! JSON files standing in for the host settings store and actor documents.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use recovery_profiles::{ConsumableEntity, EntityKind, FlagPatch, MemorySettingsStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Load a settings snapshot, starting empty when the file does not exist yet.
pub fn load_store(path: &Path) -> Result<MemorySettingsStore> {
    if !path.exists() {
        log::debug!("no snapshot at {}, starting empty", path.display());
        return Ok(MemorySettingsStore::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings snapshot {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("settings snapshot {} is not JSON", path.display()))?;
    MemorySettingsStore::from_snapshot(value)
        .with_context(|| format!("settings snapshot {} has an unexpected shape", path.display()))
}

pub fn save_store(path: &Path, store: &MemorySettingsStore) -> Result<()> {
    write_json(path, &store.snapshot())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

/// Minimal actor document: its class name and flag values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorDocument {
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub flags: FlagPatch,
}

fn default_kind() -> String {
    "Actor".to_string()
}

#[derive(Debug, Error)]
pub enum ActorWriteError {
    #[error("failed to encode actor document {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to persist actor document {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Actor backed by a JSON file; each update rewrites the file.
#[derive(Debug)]
pub struct FileActor {
    path: PathBuf,
    document: ActorDocument,
}

impl FileActor {
    pub fn open(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read actor {}", path.display()))?;
        let document = serde_json::from_str(&raw)
            .with_context(|| format!("actor {} is not a valid document", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }
}

#[async_trait]
impl ConsumableEntity for FileActor {
    type Updated = ActorDocument;
    type Error = ActorWriteError;

    fn kind(&self) -> EntityKind {
        match self.document.kind.as_str() {
            "Actor" => EntityKind::Actor,
            "Item" => EntityKind::Item,
            other => EntityKind::Other(other.to_string()),
        }
    }

    /// The in-memory document only changes once the file write succeeds.
    async fn update(&mut self, patch: FlagPatch) -> Result<Self::Updated, Self::Error> {
        let mut updated = self.document.clone();
        updated.flags.extend(patch);
        let body =
            serde_json::to_string_pretty(&updated).map_err(|source| ActorWriteError::Encode {
                path: self.path.clone(),
                source,
            })?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|source| ActorWriteError::Io {
                path: self.path.clone(),
                source,
            })?;
        self.document = updated.clone();
        Ok(updated)
    }
}
