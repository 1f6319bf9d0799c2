//! Application error codes.
//!
//! # Responsibilities
//! - Carry a stable numeric code next to the message
//! - Serialize errors for transport between processes
//! - Attach codes to log events as fields

pub mod coded;

pub use coded::CodedError;

use crate::observability::fields::Field;

/// Well-known error codes.
pub mod codes {
    /// Internal failure; message not meant for end users.
    pub const SYSTEM: i64 = 1;
    /// Failure whose message is meant for end users.
    pub const MESSAGE: i64 = 2;
    /// Network failure.
    pub const SYSTEM_NET: i64 = 3;
    /// Malformed response from a remote peer.
    pub const SYSTEM_RPC: i64 = 4;
}

/// A `scope` field naming the component that logged.
pub fn named_scope(name: impl Into<String>) -> Field {
    Field::str("scope", name)
}
