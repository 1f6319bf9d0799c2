//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! facade.rs / tracing macros (structured events, level.rs ranks, fields.rs values)
//!     → logging.rs subscriber
//!         → console (stdout)
//!         → file (append)
//!         → format.rs → fan-out sink (history + subscribers)
//!
//! fanout + subscriptions
//!     → metrics.rs (counters, gauges)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Level changes go through a reload handle, not a subscriber rebuild
//! - Metrics are cheap (atomic increments) and no-ops without a recorder

pub mod facade;
pub mod fields;
pub mod format;
pub mod level;
pub mod logging;
pub mod metrics;

pub use fields::{Field, FieldValue};
pub use level::Severity;
pub use logging::{build_subscriber, LevelHandle, LoggingError};
