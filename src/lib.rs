//! Process-local logging facade with bounded history and live fan-out.
//!
//! Every formatted log line is kept in a bounded in-memory history and
//! multicast, without blocking the producer, to any number of subscribers.
//! Subscribers pick a minimum severity and how much history to replay.

pub mod config;
pub mod errors;
pub mod fanout;
pub mod lifecycle;
pub mod observability;
pub mod service;

pub use config::RelayConfig;
pub use errors::CodedError;
pub use fanout::{LogRecord, MulticastSink, SubscribeOptions, Subscription};
pub use lifecycle::Shutdown;
pub use observability::{Field, Severity};
pub use service::{Appendable, Configurable, LogService, Subscribable};
