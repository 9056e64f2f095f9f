//! Courtside store -- persistence for saved games, settings and the theme.
//!
//! Storage is a flat string key-value capability ([`KeyValueStore`]). Two
//! backends ship with the crate: [`MemoryStore`] (optionally with a byte
//! quota) and [`FileStore`] (one file per key). [`GameRepository`] maps the
//! three persisted records onto it:
//!
//! | record   | default key           | value                                  |
//! |----------|-----------------------|----------------------------------------|
//! | games    | `basketball-games`    | JSON array of games, most recent first |
//! | settings | `basketball-settings` | JSON `{quarters, personalFoulLimit, teamFoulLimit}` |
//! | theme    | `basketball-theme`    | plain `dark` or `light`                |
//!
//! Reads are forgiving: a missing or unreadable record loads as its default.
//! Writes report failure to the caller and never panic. A write that merges
//! into the games record refuses to run when that record cannot be read, so
//! it never overwrites games it did not see.

#![deny(unsafe_code)]

pub mod backend;
pub mod fingerprint;
pub mod repository;
pub mod theme;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use fingerprint::fingerprint;
pub use repository::{GameRepository, StorageKeys};
pub use theme::Theme;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures of the raw key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Writing would grow the store past its byte quota.
    #[error("storage quota exceeded: {required} bytes needed, quota is {quota}")]
    QuotaExceeded { required: usize, quota: usize },

    /// The backend is switched off or cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key '{key}'")]
    InvalidKey { key: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a repository operation.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage failure on '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored record is not in a shape a write can safely merge into.
    #[error("failed to decode '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistenceError {
    pub(crate) fn storage(key: &str, source: StorageError) -> Self {
        PersistenceError::Storage {
            key: key.to_owned(),
            source,
        }
    }

    pub(crate) fn encode(key: &str, source: serde_json::Error) -> Self {
        PersistenceError::Encode {
            key: key.to_owned(),
            source,
        }
    }

    pub(crate) fn decode(key: &str, source: serde_json::Error) -> Self {
        PersistenceError::Decode {
            key: key.to_owned(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::backend::{FileStore, KeyValueStore, MemoryStore};
    pub use crate::fingerprint::fingerprint;
    pub use crate::repository::{GameRepository, StorageKeys};
    pub use crate::theme::Theme;
    pub use crate::{PersistenceError, StorageError};
}
