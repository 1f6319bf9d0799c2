//! Process-wide service accessor.
//!
//! Meant for the outermost layer of an application (`main`, signal
//! handlers). Library code should take an `Arc<LogService>` or one of the
//! capability traits instead.

use std::sync::{Arc, OnceLock};

use crate::config::LoggerConfig;
use crate::observability::logging::LoggingError;
use crate::service::LogService;

static SERVICE: OnceLock<Arc<LogService>> = OnceLock::new();

/// Create the process service and install its subscriber as the global default.
///
/// Succeeds once per process. The accessor is only populated once the
/// subscriber is installed, so a failed `init` leaves [`get`] empty.
pub fn init(config: LoggerConfig) -> Result<Arc<LogService>, LoggingError> {
    if SERVICE.get().is_some() {
        return Err(LoggingError::AlreadyInitialized);
    }
    let service = Arc::new(LogService::new(config));
    service.install()?;
    SERVICE
        .set(service.clone())
        .map_err(|_| LoggingError::AlreadyInitialized)?;
    Ok(service)
}

/// The service created by [`init`], if any.
pub fn get() -> Option<Arc<LogService>> {
    SERVICE.get().cloned()
}
