//! Runtime configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable                   | Default    |
//! |----------------------------|------------|
//! | `ATOMS_RELOAD_MODE`        | `standard` |
//! | `ATOMS_REPLAY_BUFFER_SIZE` | `1`        |
//! | `ATOMS_LOG_JSON`           | `false`    |

use crate::domain::ReloadMode;
use crate::error::AtomError;

/// Top-level runtime configuration.
///
/// Loaded once at startup via [`AtomsConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomsConfig {
    /// Whether object state may survive a reload boundary.
    pub reload_mode: ReloadMode,

    /// Replay buffer capacity for events built with
    /// [`crate::domain::AtomEvent::from_config`].
    pub replay_buffer_size: usize,

    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Default for AtomsConfig {
    fn default() -> Self {
        Self {
            reload_mode: ReloadMode::Standard,
            replay_buffer_size: 1,
            log_json: false,
        }
    }
}

impl AtomsConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    /// Missing or malformed numeric and boolean values fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AtomError::InvalidConfig`] if `ATOMS_RELOAD_MODE` is set to
    /// an unknown mode.
    pub fn from_env() -> Result<Self, AtomError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AtomError::InvalidConfig`] if `ATOMS_RELOAD_MODE` is set to
    /// an unknown mode.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AtomError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let reload_mode = match lookup("ATOMS_RELOAD_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.reload_mode,
        };
        let replay_buffer_size = parse_value(
            lookup("ATOMS_REPLAY_BUFFER_SIZE"),
            defaults.replay_buffer_size,
        );
        let log_json = parse_bool(lookup("ATOMS_LOG_JSON"), defaults.log_json);

        Ok(Self {
            reload_mode,
            replay_buffer_size,
            log_json,
        })
    }
}

/// Parses `raw` as `T`, returning `default` on missing or invalid values.
fn parse_value<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Parses a boolean. Accepts `"true"`, `"1"`, `"false"`, `"0"`
/// (case-insensitive). Returns `default` otherwise.
fn parse_bool(raw: Option<String>, default: bool) -> bool {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
