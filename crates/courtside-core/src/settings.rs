//! Per-game rule settings.
//!
//! Settings are chosen during setup and frozen once the game leaves
//! [`GameStatus::Setup`](crate::game::GameStatus::Setup). The persisted
//! settings record may predate a field; missing fields fall back to the
//! defaults field by field.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Maximum number of players a team may enroll.
pub const MAX_ROSTER_SIZE: usize = 15;

/// Maximum number of players a team may have on court at once.
pub const MAX_ON_COURT: usize = 5;

/// Rule settings for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// Number of quarters. Sizes the per-quarter score and foul arrays.
    pub quarters: u32,
    /// Personal fouls at which a player fouls out.
    pub personal_foul_limit: u32,
    /// Team fouls per quarter at which the penalty situation starts.
    pub team_foul_limit: u32,
}

impl Default for GameSettings {
    /// Four quarters, five personal fouls, five team fouls.
    fn default() -> Self {
        Self {
            quarters: 4,
            personal_foul_limit: 5,
            team_foul_limit: 5,
        }
    }
}

impl GameSettings {
    /// Check that every field is at least 1.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("quarters", self.quarters),
            ("personalFoulLimit", self.personal_foul_limit),
            ("teamFoulLimit", self.team_foul_limit),
        ];
        for (field, value) in fields {
            if value < 1 {
                return Err(CoreError::InvalidSettings { field, value });
            }
        }
        Ok(())
    }

    /// Length of the per-quarter arrays.
    pub fn quarter_slots(&self) -> usize {
        self.quarters as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = GameSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.quarter_slots(), 4);
    }

    #[test]
    fn zero_fields_are_rejected() {
        let settings = GameSettings {
            quarters: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(CoreError::InvalidSettings {
                field: "quarters",
                value: 0
            })
        );

        let settings = GameSettings {
            team_foul_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CoreError::InvalidSettings {
                field: "teamFoulLimit",
                ..
            })
        ));
    }

    #[test]
    fn partial_record_merges_over_defaults() {
        let settings: GameSettings = serde_json::from_str(r#"{"quarters": 2}"#).unwrap();
        assert_eq!(settings.quarters, 2);
        assert_eq!(settings.personal_foul_limit, 5);
        assert_eq!(settings.team_foul_limit, 5);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(GameSettings::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"quarters": 4, "personalFoulLimit": 5, "teamFoulLimit": 5})
        );
    }
}
