//! Severity filter over opaque records.
//!
//! Records follow the layout shared by the fmt layer and console encoders:
//!
//! ```text
//! <timestamp> <LEVEL> <target or caller> <message> ...
//! ```
//!
//! so the level is the second whitespace-delimited field. Anything that does
//! not parse passes: a malformed line must never hide an error.

use crate::observability::level::Severity;

/// Zero-based index of the severity field within a record.
pub const SEVERITY_FIELD: usize = 1;

/// Extract the severity token of `record`, if it has a recognizable one.
pub fn severity_of(record: &[u8]) -> Option<Severity> {
    let token = record
        .split(|b| b.is_ascii_whitespace())
        .filter(|field| !field.is_empty())
        .nth(SEVERITY_FIELD)?;
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Whether `record` should be forwarded to a subscriber wanting `min_level`.
pub fn accept(record: &[u8], min_level: Option<Severity>) -> bool {
    let Some(min) = min_level else {
        return true;
    };
    match severity_of(record) {
        Some(severity) => severity >= min,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBUG_LINE: &[u8] = b"2026-01-02T03:04:05.000000Z DEBUG app: warming caches\n";
    const INFO_LINE: &[u8] = b"2026-01-02T03:04:05.000000Z  INFO app: started\n";
    const ERROR_LINE: &[u8] = b"2026-01-02T03:04:05.000000Z ERROR app: disk full\n";

    #[test]
    fn test_no_minimum_accepts_everything() {
        assert!(accept(DEBUG_LINE, None));
        assert!(accept(b"", None));
    }

    #[test]
    fn test_warn_minimum_passes_only_error() {
        let min = Some(Severity::Warn);
        assert!(!accept(DEBUG_LINE, min));
        assert!(!accept(INFO_LINE, min));
        assert!(accept(ERROR_LINE, min));
    }

    #[test]
    fn test_garbage_always_passes() {
        let min = Some(Severity::Fatal);
        assert!(accept(b"not a log line at all", min));
        assert!(accept(b"single", min));
        assert!(accept(&[0xff, b' ', 0xfe, 0xfd], min));
    }

    #[test]
    fn test_tab_delimited_upper_ranks() {
        let line = b"2026-01-02T03:04:05.000Z\tDPANIC\tmain.rs:10\tinvariant broken";
        assert_eq!(severity_of(line), Some(Severity::DPanic));
        assert!(accept(line, Some(Severity::Error)));
        assert!(!accept(line, Some(Severity::Fatal)));
    }

    #[test]
    fn test_padded_level_is_found() {
        assert_eq!(severity_of(INFO_LINE), Some(Severity::Info));
        assert_eq!(severity_of(b"ts  WARN x"), Some(Severity::Warn));
    }
}
