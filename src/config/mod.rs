//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → LogService::apply_config compares with the active config
//!     → level reloaded in place, output changes reported
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes go through a full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{ConsoleConfig, FanoutConfig, FileConfig, LoggerConfig, MetricsConfig, RelayConfig};
pub use watcher::ConfigWatcher;
