//! Process-wide initialization. Kept in its own test binary: it owns the
//! global subscriber.

use log_relay::observability::LoggingError;
use log_relay::service::global;

mod common;

#[test]
fn test_failed_install_leaves_accessor_empty() {
    tracing::subscriber::set_global_default(tracing::subscriber::NoSubscriber::default())
        .expect("no global subscriber yet");

    let err = global::init(common::quiet_config(8)).err().unwrap();
    assert!(matches!(err, LoggingError::AlreadyInstalled(_)), "err: {}", err);
    assert!(global::get().is_none());

    let err = global::init(common::quiet_config(8)).err().unwrap();
    assert!(matches!(err, LoggingError::AlreadyInstalled(_)), "err: {}", err);
    assert!(global::get().is_none());
}
