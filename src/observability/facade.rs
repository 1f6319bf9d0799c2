//! Leveled logging functions taking structured [`Field`]s.
//!
//! Events go through `tracing`, so they reach every installed output,
//! including the fan-out sink. The ranks above ERROR are emitted at tracing
//! ERROR with a `severity` field naming the real rank; the fan-out formatter
//! puts that rank in the record's level slot.

use tracing::Level;

use crate::errors::CodedError;
use crate::observability::fields::{self, Field};
use crate::observability::level::Severity;

macro_rules! emit {
    ($level:expr, $msg:expr, $fields:expr) => {{
        let rendered = fields::render($fields);
        if rendered.is_empty() {
            tracing::event!($level, "{}", $msg);
        } else {
            tracing::event!($level, fields = %rendered, "{}", $msg);
        }
    }};
    ($level:expr, $severity:expr, $msg:expr, $fields:expr) => {{
        let rendered = fields::render($fields);
        if rendered.is_empty() {
            tracing::event!($level, severity = %$severity, "{}", $msg);
        } else {
            tracing::event!($level, severity = %$severity, fields = %rendered, "{}", $msg);
        }
    }};
}

/// Log `msg` at `severity`. Never panics or exits, whatever the rank.
pub fn log(severity: Severity, msg: &str, fields: &[Field]) {
    match severity {
        Severity::Trace => emit!(Level::TRACE, msg, fields),
        Severity::Debug => emit!(Level::DEBUG, msg, fields),
        Severity::Info => emit!(Level::INFO, msg, fields),
        Severity::Warn => emit!(Level::WARN, msg, fields),
        Severity::Error => emit!(Level::ERROR, msg, fields),
        Severity::DPanic | Severity::Panic | Severity::Fatal => {
            emit!(Level::ERROR, severity, msg, fields)
        }
    }
}

pub fn debug(msg: &str, fields: &[Field]) {
    log(Severity::Debug, msg, fields);
}

pub fn info(msg: &str, fields: &[Field]) {
    log(Severity::Info, msg, fields);
}

pub fn warn(msg: &str, fields: &[Field]) {
    log(Severity::Warn, msg, fields);
}

pub fn error(msg: &str, fields: &[Field]) {
    log(Severity::Error, msg, fields);
}

/// Log, then panic in debug builds only.
pub fn dpanic(msg: &str, fields: &[Field]) {
    log(Severity::DPanic, msg, fields);
    if cfg!(debug_assertions) {
        panic!("{}", msg);
    }
}

/// Log, then panic.
pub fn panic(msg: &str, fields: &[Field]) -> ! {
    log(Severity::Panic, msg, fields);
    panic!("{}", msg);
}

/// Log, then exit the process with status 1.
pub fn fatal(msg: &str, fields: &[Field]) -> ! {
    log(Severity::Fatal, msg, fields);
    std::process::exit(1);
}

/// Log a coded error at ERROR with its code and message attached.
pub fn report(msg: &str, err: &CodedError, extra: &[Field]) {
    error(msg, &err.fields_with_cause(extra));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggerConfig;
    use crate::fanout::filter::severity_of;
    use crate::fanout::MulticastSink;
    use crate::observability::logging::build_subscriber;
    use std::sync::Arc;

    fn capture(f: impl FnOnce()) -> Vec<String> {
        let mut config = LoggerConfig::default();
        config.console.enabled = false;
        config.level = "debug".into();
        let sink = Arc::new(MulticastSink::new(16));
        let (subscriber, _handle) = build_subscriber(&config, sink.clone()).unwrap();
        tracing::subscriber::with_default(subscriber, f);
        sink.recent(0).iter().map(|r| r.to_string_lossy()).collect()
    }

    #[test]
    fn test_fields_are_rendered() {
        let lines = capture(|| {
            info("user login", &[Field::str("user", "alice"), Field::int("attempt", 2)]);
        });
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("user login"));
        assert!(lines[0].contains("user=alice attempt=2"), "line: {}", lines[0]);
    }

    #[test]
    fn test_upper_ranks_keep_their_rank_in_the_record() {
        let lines = capture(|| {
            log(Severity::Fatal, "cannot continue", &[]);
            log(Severity::DPanic, "should not happen", &[Field::int("shard", 3)]);
            error("plain failure", &[]);
        });
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(" FATAL "), "line: {}", lines[0]);
        assert_eq!(severity_of(lines[0].as_bytes()), Some(Severity::Fatal));
        assert_eq!(severity_of(lines[1].as_bytes()), Some(Severity::DPanic));
        assert!(lines[1].contains("shard=3"), "line: {}", lines[1]);
        assert_eq!(severity_of(lines[2].as_bytes()), Some(Severity::Error));
    }

    #[test]
    fn test_report_coded_error() {
        let err = CodedError::message("quota exceeded");
        let lines = capture(|| report("request rejected", &err, &[]));
        assert!(lines[0].contains("errCode=2"), "line: {}", lines[0]);
        assert!(lines[0].contains("error=\"quota exceeded\""), "line: {}", lines[0]);
    }

    #[test]
    #[should_panic(expected = "broken invariant")]
    fn test_panic_logs_then_panics() {
        panic("broken invariant", &[]);
    }
}
