//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::fanout::{DEFAULT_BUFFER_SIZE, DEFAULT_HISTORY_CAPACITY};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Logger settings.
    pub logger: LoggerConfig,

    /// Metrics exporter settings.
    pub metrics: MetricsConfig,
}

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum level (trace, debug, info, warn, error, dpanic, panic, fatal).
    pub level: String,

    /// Suppress all output regardless of `level`.
    pub disabled: bool,

    /// Include source file and line in console and file output.
    pub caller: bool,

    /// Console output.
    pub console: ConsoleConfig,

    /// Plain file output.
    pub file: FileConfig,

    /// In-memory history and subscriber defaults.
    pub fanout: FanoutConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            disabled: false,
            caller: false,
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            fanout: FanoutConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Whether applying `other` requires rebuilding the output layers.
    pub fn outputs_differ(&self, other: &LoggerConfig) -> bool {
        self.caller != other.caller
            || self.console != other.console
            || self.file != other.file
            || self.fanout != other.fanout
    }

    /// Replace the output sections with those of `applied`, keeping the level.
    pub fn keep_outputs_of(&mut self, applied: &LoggerConfig) {
        self.caller = applied.caller;
        self.console = applied.console.clone();
        self.file = applied.file.clone();
        self.fanout = applied.fanout.clone();
    }
}

/// Console output configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Write to stdout.
    pub enabled: bool,

    /// Colorize levels with ANSI escapes.
    pub ansi: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ansi: true,
        }
    }
}

/// File output configuration. The file is appended to, never rotated.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    /// Write to `path`.
    pub enabled: bool,

    /// Destination file; parent directories are created on demand.
    pub path: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "./logs/service.log".to_string(),
        }
    }
}

/// Fan-out configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FanoutConfig {
    /// Number of records kept for replay and `recent` queries.
    pub history_capacity: usize,

    /// Channel capacity for subscribers that ask for zero.
    pub default_buffer: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_buffer: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Start the Prometheus endpoint.
    pub enabled: bool,

    /// Bind address of the endpoint.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:9090".to_string(),
        }
    }
}
