//! Data-driven balance content and loaders.
//!
//! This crate turns TOML data files into the [`game_core::BalanceTables`]
//! the simulation runs on:
//! - Combat, wave, and drop tuning (`tables.toml`)
//! - Equipment set definitions (`sets.toml`)
//! - Achievement definitions (`achievements.toml`)
//!
//! Every table has a compiled-in default, so a missing or partial file is
//! never fatal: strict loaders surface errors for tools, and the lenient
//! entry points fall back to defaults with a log line for the game itself.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AchievementLoader, ContentFactory, SetLoader, TablesLoader,
};
