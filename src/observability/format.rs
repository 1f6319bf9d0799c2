//! Event formatter for the fan-out stream.
//!
//! ```text
//! <timestamp> <LEVEL> [span{fields}:]* <target>: <message> <fields>
//! ```
//!
//! The level slot holds the full severity rank. ERROR events carrying a
//! `severity` field above ERROR (see `facade`) are written as `DPANIC`,
//! `PANIC` or `FATAL` so subscribers filtering on those ranks see them.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

use crate::observability::level::Severity;

/// Name of the field that raises an ERROR event to an upper rank.
pub const SEVERITY_FIELD: &str = "severity";

/// Plain, single-line formatter with the rank in the second field.
#[derive(Debug, Default, Clone, Copy)]
pub struct FanoutFormat;

impl FanoutFormat {
    pub fn new() -> Self {
        FanoutFormat
    }
}

/// The rank to print for `event`.
pub fn event_severity(event: &Event<'_>) -> Severity {
    let level = Severity::from_level(event.metadata().level());
    if *event.metadata().level() != Level::ERROR {
        return level;
    }
    let mut visitor = RankVisitor::default();
    event.record(&mut visitor);
    match visitor.rank {
        Some(rank) if rank > Severity::Error => rank,
        _ => level,
    }
}

#[derive(Default)]
struct RankVisitor {
    rank: Option<Severity>,
}

impl Visit for RankVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == SEVERITY_FIELD {
            self.rank = value.parse().ok();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == SEVERITY_FIELD {
            self.rank = format!("{:?}", value).parse().ok();
        }
    }
}

impl<S, N> FormatEvent<S, N> for FanoutFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        SystemTime.format_time(&mut writer)?;
        write!(writer, " {:>5} ", event_severity(event).as_token())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
                write!(writer, ":")?;
            }
            write!(writer, " ")?;
        }

        write!(writer, "{}: ", event.metadata().target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
