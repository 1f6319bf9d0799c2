//! Opaque log record.

use std::fmt;
use std::ops::Deref;

/// One fully formatted log line.
///
/// The fan-out core never looks inside a record except to pull a severity
/// token out of it. Each destination owns its own allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LogRecord(Box<[u8]>);

impl LogRecord {
    /// Copy `bytes` into a new record.
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_vec()
    }

    /// Lossy UTF-8 view, for display.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl Deref for LogRecord {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for LogRecord {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for LogRecord {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl From<&str> for LogRecord {
    fn from(s: &str) -> Self {
        Self::copy_from(s.as_bytes())
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LogRecord")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

/// A record tagged with the sequence number the history ring assigned to it.
#[derive(Debug, Clone)]
pub(crate) struct Sequenced {
    pub seq: u64,
    pub record: LogRecord,
}
