//! Content loaders for reading balance data from files.
//!
//! All loaders parse TOML into `game-core` types via serde. Fields left
//! out of a file keep their compiled-in defaults, so data files only need
//! to spell out what they change.

pub mod achievements;
pub mod factory;
pub mod sets;
pub mod tables;

pub use achievements::AchievementLoader;
pub use factory::ContentFactory;
pub use sets::SetLoader;
pub use tables::TablesLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
