//! Equipment set catalog loader.

use std::path::Path;

use game_core::SetDef;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Set catalog structure for TOML files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCatalog {
    pub sets: Vec<SetDef>,
}

/// Loader for equipment set definitions from TOML files.
pub struct SetLoader;

impl SetLoader {
    /// Load the set catalog from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing a `SetCatalog`
    ///
    /// # Returns
    ///
    /// Returns a Vec of SetDefs.
    pub fn load(path: &Path) -> LoadResult<Vec<SetDef>> {
        let content = read_file(path)?;
        let catalog: SetCatalog = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse set catalog TOML: {}", e))?;

        Ok(catalog.sets)
    }
}
