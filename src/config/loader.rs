//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    let config: RelayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config("[logger]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.logger.level, "warn");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[logger\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config("[logger]\nlevel = \"chatty\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert_eq!(
            err.to_string(),
            "Validation failed: logger.level: unrecognized level \"chatty\""
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("log_relay_loader_test.toml");
        std::fs::write(&path, "[logger.fanout]\nhistory_capacity = 7\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.logger.fanout.history_capacity, 7);

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
