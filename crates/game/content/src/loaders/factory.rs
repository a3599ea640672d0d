//! Content factory for assembling the balance tables from a data directory.

use std::path::{Path, PathBuf};

use game_core::BalanceTables;

use crate::loaders::{AchievementLoader, LoadResult, SetLoader, TablesLoader};

/// Content factory that loads all balance data from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── tables.toml
/// ├── sets.toml
/// └── achievements.toml
/// ```
///
/// Each file is optional; anything absent keeps its compiled-in default.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load balance tables from `tables.toml`.
    pub fn load_tables(&self) -> LoadResult<BalanceTables> {
        let path = self.data_dir.join("tables.toml");
        TablesLoader::load(&path)
    }

    /// Load equipment set definitions from `sets.toml`.
    pub fn load_sets(&self) -> LoadResult<Vec<game_core::SetDef>> {
        let path = self.data_dir.join("sets.toml");
        SetLoader::load(&path)
    }

    /// Load achievement definitions from `achievements.toml`.
    pub fn load_achievements(&self) -> LoadResult<Vec<game_core::tables::AchievementDef>> {
        let path = self.data_dir.join("achievements.toml");
        AchievementLoader::load(&path)
    }

    /// Assemble the full balance tables, tolerating missing files.
    ///
    /// `tables.toml` goes through the lenient loader; the set and
    /// achievement catalogs override the table defaults only when their
    /// files are present and parse cleanly.
    pub fn assemble(&self) -> BalanceTables {
        let mut tables = TablesLoader::load_or_default(&self.data_dir.join("tables.toml"));

        let sets_path = self.data_dir.join("sets.toml");
        if sets_path.exists() {
            match SetLoader::load(&sets_path) {
                Ok(sets) => tables.sets = sets,
                Err(e) => {
                    tracing::warn!(error = %e, "set catalog rejected, keeping defaults");
                }
            }
        }

        let ach_path = self.data_dir.join("achievements.toml");
        if ach_path.exists() {
            match AchievementLoader::load(&ach_path) {
                Ok(defs) => tables.achievements = defs,
                Err(e) => {
                    tracing::warn!(error = %e, "achievement catalog rejected, keeping defaults");
                }
            }
        }

        tables
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn assemble_overlays_catalogs_onto_table_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tables.toml"),
            "[waves]\ninterval_ms = 20000\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("sets.toml"),
            r#"
[[sets]]
id = "gale"
name = "Gale Chorus"

[[sets.bonuses]]
pieces = 2
stat = "fire_rate_mul"
value = 0.04
"#,
        )
        .unwrap();

        let factory = ContentFactory::new(dir.path());
        let tables = factory.assemble();
        assert_eq!(tables.waves.interval_ms, 20000);
        assert_eq!(tables.sets.len(), 1);
        assert_eq!(tables.sets[0].id, "gale");
        // No achievements.toml: compiled-in defaults survive.
        assert!(!tables.achievements.is_empty());
    }

    #[test]
    fn assemble_on_empty_dir_is_all_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let tables = ContentFactory::new(dir.path()).assemble();
        let defaults = BalanceTables::default();
        assert_eq!(tables.waves.interval_ms, defaults.waves.interval_ms);
        assert_eq!(tables.sets.len(), defaults.sets.len());
    }
}
