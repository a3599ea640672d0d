//! Achievement catalog loader.

use std::path::Path;

use game_core::tables::AchievementDef;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Achievement catalog structure for TOML files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementCatalog {
    pub achievements: Vec<AchievementDef>,
}

/// Loader for achievement definitions from TOML files.
pub struct AchievementLoader;

impl AchievementLoader {
    /// Load the achievement catalog from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing an `AchievementCatalog`
    ///
    /// # Returns
    ///
    /// Returns a Vec of AchievementDefs.
    pub fn load(path: &Path) -> LoadResult<Vec<AchievementDef>> {
        let content = read_file(path)?;
        let catalog: AchievementCatalog = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse achievement catalog TOML: {}", e))?;

        Ok(catalog.achievements)
    }
}
