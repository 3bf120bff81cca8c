//! Presentation settings read from the environment.

use chrono::FixedOffset;

use crate::state::ReloadOrdering;

/// Asia/Colombo, UTC+05:30.
pub const DEFAULT_DISPLAY_OFFSET_MINUTES: i32 = 330;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{var} must be minutes in -1439..=1439, got {value:?}")]
    InvalidOffset { var: &'static str, value: String },

    #[error("{var}: {reason}")]
    InvalidOrdering { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy)]
pub struct ViewSettings {
    pub display_offset: FixedOffset,
    pub ordering: ReloadOrdering,
}

impl ViewSettings {
    /// | Env Var                              | Default        |
    /// |--------------------------------------|----------------|
    /// | `PMTRACK_DISPLAY_UTC_OFFSET_MINUTES` | `330`          |
    /// | `PMTRACK_RELOAD_ORDERING`            | `last-arrival` |
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        const OFFSET_VAR: &str = "PMTRACK_DISPLAY_UTC_OFFSET_MINUTES";
        const ORDERING_VAR: &str = "PMTRACK_RELOAD_ORDERING";

        let minutes = match lookup(OFFSET_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<i32>()
                .map_err(|_| SettingsError::InvalidOffset {
                    var: OFFSET_VAR,
                    value: raw.clone(),
                })?,
            None => DEFAULT_DISPLAY_OFFSET_MINUTES,
        };
        let display_offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| SettingsError::InvalidOffset {
                var: OFFSET_VAR,
                value: minutes.to_string(),
            })?;

        let ordering = match lookup(ORDERING_VAR) {
            Some(raw) => raw
                .parse::<ReloadOrdering>()
                .map_err(|reason| SettingsError::InvalidOrdering {
                    var: ORDERING_VAR,
                    reason,
                })?,
            None => ReloadOrdering::default(),
        };

        Ok(Self {
            display_offset,
            ordering,
        })
    }
}
