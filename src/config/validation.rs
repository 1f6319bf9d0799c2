//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and formats
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::observability::level::Severity;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("logger.level: unrecognized level {0:?}")]
    UnknownLevel(String),

    #[error("logger.file.path must not be empty when file output is enabled")]
    EmptyFilePath,

    #[error("metrics.address: {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.logger.level.parse::<Severity>().is_err() {
        errors.push(ValidationError::UnknownLevel(config.logger.level.clone()));
    }

    if config.logger.file.enabled && config.logger.file.path.trim().is_empty() {
        errors.push(ValidationError::EmptyFilePath);
    }

    if config.metrics.enabled && config.metrics.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.metrics.address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = RelayConfig::default();
        config.logger.level = "loud".into();
        config.logger.file.enabled = true;
        config.logger.file.path = "  ".into();
        config.metrics.enabled = true;
        config.metrics.address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnknownLevel("loud".into()),
                ValidationError::EmptyFilePath,
                ValidationError::InvalidMetricsAddress("nowhere".into()),
            ]
        );
    }

    #[test]
    fn test_disabled_sections_are_not_checked() {
        let mut config = RelayConfig::default();
        config.logger.file.path = String::new();
        config.metrics.address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
