//! Logging service: the fan-out core plus the level and config controls.
//!
//! # Responsibilities
//! - Own the multicast sink and the subscription manager
//! - Build and install the tracing subscriber that feeds the sink
//! - Apply configuration reloads
//!
//! # Design Decisions
//! - Constructed explicitly and shared by `Arc`; `global` is only a
//!   convenience for the outermost layer of an application
//! - Collaborators depend on the narrow capability they use:
//!   [`Appendable`], [`Subscribable`] or [`Configurable`]

pub mod global;

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use tracing::Subscriber;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggerConfig;
use crate::fanout::{LogRecord, MulticastSink, SubscribeOptions, Subscription, SubscriptionManager};
use crate::observability::level::Severity;
use crate::observability::logging::{build_subscriber, LevelHandle, LoggingError};

/// Accepts raw formatted records.
pub trait Appendable: Send + Sync {
    fn append(&self, record: &[u8]);
}

/// Offers live and historical views of the log stream.
pub trait Subscribable: Send + Sync {
    fn subscribe(&self, opts: SubscribeOptions) -> Subscription;
    fn recent(&self, limit: usize) -> Vec<LogRecord>;
}

/// Accepts configuration changes at runtime.
pub trait Configurable: Send + Sync {
    /// Apply `config`. Returns `Ok(false)` when nothing that can change at
    /// runtime changed.
    fn apply_config(&self, config: LoggerConfig) -> Result<bool, LoggingError>;
    fn set_level(&self, level: &str) -> Result<(), LoggingError>;
    fn set_disabled(&self, disabled: bool) -> Result<(), LoggingError>;
    fn current_config(&self) -> Arc<LoggerConfig>;
}

impl Appendable for MulticastSink {
    fn append(&self, record: &[u8]) {
        self.publish(record);
    }
}

/// The process logging service.
pub struct LogService {
    sink: Arc<MulticastSink>,
    subscriptions: SubscriptionManager,
    config: ArcSwap<LoggerConfig>,
    level: OnceLock<LevelHandle>,
}

impl LogService {
    pub fn new(config: LoggerConfig) -> Self {
        let sink = Arc::new(MulticastSink::new(config.fanout.history_capacity));
        let subscriptions = SubscriptionManager::new(sink.clone(), config.fanout.default_buffer);
        Self {
            sink,
            subscriptions,
            config: ArcSwap::from_pointee(config),
            level: OnceLock::new(),
        }
    }

    pub fn sink(&self) -> &Arc<MulticastSink> {
        &self.sink
    }

    /// Build the subscriber for the current config and take over its level control.
    ///
    /// Can only be done once per service.
    pub fn subscriber(&self) -> Result<impl Subscriber + Send + Sync + 'static, LoggingError> {
        let config = self.config.load_full();
        let (subscriber, handle) = build_subscriber(&config, self.sink.clone())?;
        self.level
            .set(handle)
            .map_err(|_| LoggingError::AlreadyInitialized)?;
        Ok(subscriber)
    }

    /// Install the subscriber as the process-wide default.
    pub fn install(&self) -> Result<(), LoggingError> {
        self.subscriber()?.try_init()?;
        let config = self.config.load();
        tracing::debug!(
            level = %config.level,
            console = config.console.enabled,
            file = config.file.enabled,
            history_capacity = self.sink.history_capacity(),
            "Logging installed"
        );
        Ok(())
    }

    fn reload_level(&self, severity: Severity, disabled: bool) -> Result<(), LoggingError> {
        match self.level.get() {
            Some(handle) => handle.set(severity, disabled),
            // Not built yet; the stored config is used when it is.
            None => Ok(()),
        }
    }

    fn parse_level(level: &str) -> Result<Severity, LoggingError> {
        level.parse::<Severity>().map_err(|e| {
            tracing::warn!(level = %level, "Unrecognized log level, keeping current level");
            LoggingError::from(e)
        })
    }
}

impl Appendable for LogService {
    fn append(&self, record: &[u8]) {
        self.sink.publish(record);
    }
}

impl Subscribable for LogService {
    fn subscribe(&self, opts: SubscribeOptions) -> Subscription {
        self.subscriptions.subscribe(opts)
    }

    fn recent(&self, limit: usize) -> Vec<LogRecord> {
        self.sink.recent(limit)
    }
}

impl Configurable for LogService {
    fn apply_config(&self, mut config: LoggerConfig) -> Result<bool, LoggingError> {
        let current = self.config.load_full();
        if *current == config {
            tracing::debug!("Logger config unchanged");
            return Ok(false);
        }

        let level_changed = current.level != config.level || current.disabled != config.disabled;
        if level_changed {
            let severity = Self::parse_level(&config.level)?;
            self.reload_level(severity, config.disabled)?;
            tracing::info!(level = %severity, disabled = config.disabled, "Log level updated");
        }

        if current.outputs_differ(&config) {
            tracing::warn!("Logger output settings changed; restart to apply them");
            config.keep_outputs_of(&current);
        }

        if level_changed {
            self.config.store(Arc::new(config));
        }
        Ok(level_changed)
    }

    fn set_level(&self, level: &str) -> Result<(), LoggingError> {
        let severity = Self::parse_level(level)?;
        let mut config = (*self.config.load_full()).clone();
        self.reload_level(severity, config.disabled)?;
        config.level = severity.as_str().to_string();
        self.config.store(Arc::new(config));
        Ok(())
    }

    fn set_disabled(&self, disabled: bool) -> Result<(), LoggingError> {
        let mut config = (*self.config.load_full()).clone();
        let severity = Self::parse_level(&config.level)?;
        self.reload_level(severity, disabled)?;
        config.disabled = disabled;
        self.config.store(Arc::new(config));
        Ok(())
    }

    fn current_config(&self) -> Arc<LoggerConfig> {
        self.config.load_full()
    }
}
