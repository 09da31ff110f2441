//! Resolver configuration, loadable from TOML.
//!
//! ```toml
//! # resolver.toml
//! max_occurrences = 260
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, ScheduleError};

/// Ten years of a weekly session.
pub const DEFAULT_MAX_OCCURRENCES: usize = 520;

/// Tunables for the booking resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound on `repeat_weeks * |weekdays|` for one recurring request.
    #[serde(default = "default_max_occurrences")]
    pub max_occurrences: usize,
}

fn default_max_occurrences() -> usize {
    DEFAULT_MAX_OCCURRENCES
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_occurrences: default_max_occurrences(),
        }
    }
}

impl ResolverConfig {
    /// Parse configuration from TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns `ScheduleError::Config` on malformed TOML or a zero limit.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: ResolverConfig = toml::from_str(s)
            .map_err(|e| ScheduleError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `ScheduleError::Config` if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ScheduleError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.max_occurrences == 0 {
            return Err(ScheduleError::Config(
                "max_occurrences must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ResolverConfig::from_toml_str("").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.max_occurrences, 520);
    }

    #[test]
    fn explicit_limit_is_read() {
        let config = ResolverConfig::from_toml_str("max_occurrences = 12").unwrap();
        assert_eq!(config.max_occurrences, 12);
    }

    #[test]
    fn zero_limit_rejected() {
        let err = ResolverConfig::from_toml_str("max_occurrences = 0").unwrap_err();
        assert!(matches!(err, ScheduleError::Config(_)));
    }

    #[test]
    fn malformed_toml_rejected() {
        let err = ResolverConfig::from_toml_str("max_occurrences = \"lots\"").unwrap_err();
        assert!(matches!(err, ScheduleError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_occurrences = 40").unwrap();
        let config = ResolverConfig::load(file.path()).unwrap();
        assert_eq!(config.max_occurrences, 40);
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = ResolverConfig::load("/nonexistent/resolver.toml").unwrap_err();
        assert!(matches!(err, ScheduleError::Config(_)));
    }
}
