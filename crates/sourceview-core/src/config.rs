//! Session configuration.
//!
//! Loaded from JSON; every field is optional and falls back to its default.
//!
//! ```rust
//! use sourceview_core::SourceConfig;
//!
//! let config = SourceConfig::from_json_str(r#"{ "default_tab_size": 4 }"#).unwrap();
//! assert_eq!(config.default_tab_size, 4);
//! assert!(config.auto_tab_char_and_size);
//! ```

use crate::error::Result;
use crate::indent::IndentUnit;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "SOURCEVIEW_CONFIG";

/// Editing behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Indentation character used when inference is off or fails.
    pub default_tab_char: char,
    /// Indentation width used when inference is off or fails.
    pub default_tab_size: usize,
    /// Infer the indent unit from the buffer on open.
    pub auto_tab_char_and_size: bool,
    /// Tab indents the whole line; when `false`, Tab without a selection inserts at the cursor.
    pub tab_indents_line: bool,
    /// Strip trailing whitespace before saving.
    pub cleanup_whitespace_characters: bool,
    /// Delay before idle side effects run, in milliseconds.
    pub idle_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            default_tab_char: ' ',
            default_tab_size: 2,
            auto_tab_char_and_size: true,
            tab_indents_line: true,
            cleanup_whitespace_characters: false,
            idle_delay_ms: 100,
        }
    }
}

impl SourceConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        IndentUnit::new(config.default_tab_char, config.default_tab_size)?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load the file named by [`CONFIG_ENV_VAR`], or the defaults if the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// The configured default unit (two spaces if the fields are out of range).
    pub fn default_indent_unit(&self) -> IndentUnit {
        IndentUnit::new(self.default_tab_char, self.default_tab_size).unwrap_or_default()
    }

    /// [`Self::idle_delay_ms`] as a duration.
    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SourceConfig::from_json_str(r#"{"default_tab_char": "\t", "default_tab_size": 1}"#)
            .expect("valid config");
        assert_eq!(config.default_indent_unit(), IndentUnit::tab());
        assert!(config.tab_indents_line);
        assert_eq!(config.idle_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_invalid_unit_rejected() {
        let err = SourceConfig::from_json_str(r#"{"default_tab_char": "x"}"#).unwrap_err();
        assert!(matches!(err, SourceError::InvalidIndentUnit { .. }));
        let err = SourceConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, SourceError::Config(_)));
    }

    #[test]
    fn test_round_trip() {
        let config = SourceConfig {
            cleanup_whitespace_characters: true,
            ..SourceConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        assert_eq!(SourceConfig::from_json_str(&json).expect("parse"), config);
    }
}
