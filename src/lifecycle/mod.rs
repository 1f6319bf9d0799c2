//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger → every ShutdownSignal resolves → background loops exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - A watch channel backs the signal, so loops started after the trigger
//!   still stop
//! - Config reloads come from the file watcher, not from SIGHUP

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
