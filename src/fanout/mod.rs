//! Log fan-out and replay subsystem.
//!
//! # Data Flow
//! ```text
//! Producer (tracing fmt layer, or any io::Write user)
//!     → sink.rs (MulticastSink::write)
//!         → ring.rs (bounded history)
//!         → registry.rs (each subscriber's raw channel, non-blocking)
//!
//! Consumer
//!     → subscription.rs (register, replay, spawn forwarder)
//!         → filter.rs (minimum severity, fail-open)
//!         → caller's channel
//! ```
//!
//! # Design Decisions
//! - Producers never wait on consumers: every send is a `try_send`
//! - Full buffers drop; closed channels are pruned on the next write
//! - Memory is bounded by ring capacity plus each subscriber's buffer

pub mod filter;
pub mod record;
pub mod registry;
pub mod ring;
pub mod sink;
pub mod subscription;

pub use record::LogRecord;
pub use registry::{SubscriberId, SubscriberRegistry};
pub use ring::{HistoryRing, DEFAULT_HISTORY_CAPACITY};
pub use sink::MulticastSink;
pub use subscription::{
    SubscribeOptions, Subscription, SubscriptionHandle, SubscriptionManager, DEFAULT_BUFFER_SIZE,
};
