//! Balance tables loader.

use std::path::Path;

use game_core::BalanceTables;

use crate::loaders::{LoadResult, read_file};

/// Loader for the balance tables from TOML files.
///
/// Every field of [`BalanceTables`] is optional in the file; anything
/// absent keeps its compiled-in default value.
pub struct TablesLoader;

impl TablesLoader {
    /// Load balance tables from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing balance overrides
    ///
    /// # Returns
    ///
    /// Returns the parsed tables, or an error if the file is missing or
    /// malformed.
    pub fn load(path: &Path) -> LoadResult<BalanceTables> {
        let content = read_file(path)?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse balance TOML: {}", e))
    }

    /// Load balance tables, falling back to defaults on any failure.
    ///
    /// A missing file is expected for fresh installs and logged at debug;
    /// a file that exists but fails to parse is logged at warn so bad
    /// data never ships silently. Either way the game runs on defaults.
    pub fn load_or_default(path: &Path) -> BalanceTables {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no balance file, using defaults");
            return BalanceTables::default();
        }
        match Self::load(path) {
            Ok(tables) => tables,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "balance file rejected, using defaults");
                BalanceTables::default()
            }
        }
    }
}
