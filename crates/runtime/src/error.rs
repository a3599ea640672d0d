//! Error types raised by profile stores.

use thiserror::Error;

/// Errors surfaced by profile store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
