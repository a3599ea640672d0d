//! Profile persistence.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::profile::{Profile, migrate};

/// Store contract for the persistent profile.
///
/// There is exactly one profile per store; daily seeds, balance tables,
/// and run state never pass through here.
pub trait ProfileStore: Send + Sync {
    /// Persist the profile.
    fn save(&self, profile: &Profile) -> Result<()>;

    /// Load the profile, migrating old save versions.
    ///
    /// Returns `None` when no save exists yet. A save that exists but
    /// cannot be decoded yields the default profile rather than an
    /// error.
    fn load(&self) -> Result<Option<Profile>>;
}

/// File-backed implementation of ProfileStore.
///
/// The profile is stored as a single JSON file. Saves write to a temp
/// file in the same directory and rename over the target, so a crash
/// mid-write leaves the previous save intact.
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    /// Create a store at an explicit path, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }
        Ok(Self { path })
    }

    /// Create a store at the platform-conventional data directory.
    pub fn at_default_location(app_name: &str) -> Result<Self> {
        let path = match directories::ProjectDirs::from("", "", app_name) {
            Some(dirs) => dirs.data_dir().join("profile.json"),
            None => PathBuf::from(format!("{app_name}-profile.json")),
        };
        Self::new(path)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileProfileStore {
    fn save(&self, profile: &Profile) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(profile)
            .map_err(|e| StoreError::Json(e.to_string()))?;

        fs::write(&temp_path, bytes).map_err(StoreError::Io)?;
        fs::rename(&temp_path, &self.path).map_err(StoreError::Io)?;

        tracing::debug!("Saved profile to {}", self.path.display());

        Ok(())
    }

    fn load(&self) -> Result<Option<Profile>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path).map_err(StoreError::Io)?;
        let value: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "profile file is not valid JSON, starting fresh"
                );
                return Ok(Some(Profile::default()));
            }
        };

        tracing::debug!("Loaded profile from {}", self.path.display());

        Ok(Some(migrate(value)))
    }
}

/// In-memory implementation of ProfileStore for tests and headless runs.
#[derive(Default)]
pub struct MemoryProfileStore {
    profile: RwLock<Option<Profile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn save(&self, profile: &Profile) -> Result<()> {
        let mut slot = self
            .profile
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        *slot = Some(profile.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Profile>> {
        let slot = self
            .profile
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(slot.clone())
    }
}
