//! Session configuration.

use serde::{Deserialize, Serialize};

use courtside_store::StorageKeys;

/// When a session writes the current game to storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// After every successful mutation.
    #[default]
    Immediate,
    /// Only on an explicit [`flush`](crate::SessionStore::flush); mutations
    /// just mark the session dirty.
    Deferred,
}

/// Configuration for a [`SessionStore`](crate::SessionStore).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub flush_policy: FlushPolicy,
    pub storage_keys: StorageKeys,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_flush_immediately_under_standard_keys() {
        let config = SessionConfig::default();
        assert_eq!(config.flush_policy, FlushPolicy::Immediate);
        assert_eq!(config.storage_keys.games, "basketball-games");
        assert_eq!(config.storage_keys.settings, "basketball-settings");
        assert_eq!(config.storage_keys.theme, "basketball-theme");
    }
}
