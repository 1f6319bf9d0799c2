//! Structured logging.
//!
//! # Responsibilities
//! - Build the tracing subscriber from `LoggerConfig`
//! - Tee every event to console, file and the fan-out sink
//! - Change the log level at runtime
//!
//! # Design Decisions
//! - The level filter is wrapped in `reload::Layer` so config reloads and
//!   `set_level` take effect without rebuilding the subscriber
//! - The fan-out layer uses `FanoutFormat`: no ANSI, timestamp first and the
//!   full severity rank in the second field, where the subscription filter
//!   looks for it
//! - File output appends to a plain file; rotation is left to the operator

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::config::LoggerConfig;
use crate::fanout::MulticastSink;
use crate::observability::format::FanoutFormat;
use crate::observability::level::{Severity, UnknownSeverity};

/// Errors raised while setting up or adjusting logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    InvalidLevel(#[from] UnknownSeverity),

    #[error("global subscriber already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),

    #[error("logging service already initialized")]
    AlreadyInitialized,

    #[error("failed to reload level filter: {0}")]
    Reload(#[from] reload::Error),
}

/// Runtime control over the level filter of a built subscriber.
#[derive(Clone)]
pub struct LevelHandle {
    inner: reload::Handle<EnvFilter, Registry>,
}

impl LevelHandle {
    /// Replace the active filter.
    pub fn set(&self, severity: Severity, disabled: bool) -> Result<(), LoggingError> {
        self.inner.reload(level_filter(severity, disabled))?;
        Ok(())
    }
}

fn level_filter(severity: Severity, disabled: bool) -> EnvFilter {
    let level = if disabled {
        LevelFilter::OFF
    } else {
        severity.as_level_filter()
    };
    EnvFilter::new(level.to_string())
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    let open = || -> io::Result<File> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(path)
    };
    open().map_err(|source| LoggingError::FileOpen {
        path: path.to_string(),
        source,
    })
}

/// Build a subscriber that tees events to the configured outputs and `sink`.
pub fn build_subscriber(
    config: &LoggerConfig,
    sink: Arc<MulticastSink>,
) -> Result<(impl Subscriber + Send + Sync + 'static, LevelHandle), LoggingError> {
    let severity: Severity = config.level.parse()?;
    let (filter, handle) = reload::Layer::new(level_filter(severity, config.disabled));

    let console = config.console.enabled.then(|| {
        fmt::layer()
            .with_ansi(config.console.ansi)
            .with_file(config.caller)
            .with_line_number(config.caller)
    });

    let file = if config.file.enabled {
        let file = open_log_file(&config.file.path)?;
        Some(
            fmt::layer()
                .with_ansi(false)
                .with_file(config.caller)
                .with_line_number(config.caller)
                .with_writer(Arc::new(file)),
        )
    } else {
        None
    };

    let fanout = fmt::layer()
        .with_ansi(false)
        .event_format(FanoutFormat::new())
        .with_writer(sink);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .with(fanout);

    Ok((subscriber, LevelHandle { inner: handle }))
}
