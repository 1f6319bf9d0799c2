//! Severity scale shared by the facade, the level filter and the config.
//!
//! # Ordering
//! ```text
//! trace < debug < info < warn < error < dpanic < panic < fatal
//! ```
//!
//! `tracing` stops at ERROR. The facade marks the three upper ranks with a
//! `severity` field on an ERROR event, and the fan-out formatter writes that
//! rank back into the level slot of the record.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;

/// Log severity, strictly ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    DPanic,
    Panic,
    Fatal,
}

/// Returned when a string names no known severity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized log level: {0:?}")]
pub struct UnknownSeverity(pub String);

impl Severity {
    /// Lowercase name, as written in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::DPanic => "dpanic",
            Severity::Panic => "panic",
            Severity::Fatal => "fatal",
        }
    }

    pub fn from_level(level: &Level) -> Severity {
        match *level {
            Level::TRACE => Severity::Trace,
            Level::DEBUG => Severity::Debug,
            Level::INFO => Severity::Info,
            Level::WARN => Severity::Warn,
            Level::ERROR => Severity::Error,
        }
    }

    /// Uppercase name, as written in the level slot of a record.
    pub fn as_token(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::DPanic => "DPANIC",
            Severity::Panic => "PANIC",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parse a user-supplied minimum level for a subscription.
    ///
    /// Empty and unrecognized strings both mean "no filter".
    pub fn parse_filter(s: &str) -> Option<Severity> {
        s.parse().ok()
    }

    /// The closest `tracing` filter. Everything above ERROR collapses onto it.
    pub fn as_level_filter(&self) -> LevelFilter {
        match self {
            Severity::Trace => LevelFilter::TRACE,
            Severity::Debug => LevelFilter::DEBUG,
            Severity::Info => LevelFilter::INFO,
            Severity::Warn => LevelFilter::WARN,
            Severity::Error | Severity::DPanic | Severity::Panic | Severity::Fatal => {
                LevelFilter::ERROR
            }
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let severity = match token.to_ascii_lowercase().as_str() {
            "trace" => Severity::Trace,
            "debug" => Severity::Debug,
            "info" => Severity::Info,
            "warn" | "warning" => Severity::Warn,
            "error" => Severity::Error,
            "dpanic" => Severity::DPanic,
            "panic" => Severity::Panic,
            "fatal" => Severity::Fatal,
            _ => return Err(UnknownSeverity(token.to_string())),
        };
        Ok(severity)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
