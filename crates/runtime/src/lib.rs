//! Persistence and session orchestration around the simulation kernel.
//!
//! `game-core` is pure and owns the rules; this crate owns everything
//! with a lifetime longer than one run:
//! - [`profile`] holds the persistent player profile and save migration
//! - [`store`] persists the profile (file-backed or in-memory)
//! - [`session`] builds runs from the profile and folds results back
pub mod error;
pub mod profile;
pub mod session;
pub mod store;

pub use error::{Result, StoreError};
pub use profile::{CURRENT_VERSION, EquipmentBag, GemBag, Loadout, Profile, Toggles, migrate};
pub use session::{EconomyError, Session};
pub use store::{FileProfileStore, MemoryProfileStore, ProfileStore};
