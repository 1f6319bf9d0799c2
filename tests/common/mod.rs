//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::timeout;

use log_relay::config::LoggerConfig;
use log_relay::fanout::SubscriptionManager;
use log_relay::{MulticastSink, Subscription};

/// Logger config with no console or file output.
pub fn quiet_config(history_capacity: usize) -> LoggerConfig {
    let mut config = LoggerConfig::default();
    config.console.enabled = false;
    config.file.enabled = false;
    config.fanout.history_capacity = history_capacity;
    config
}

pub fn manager(history_capacity: usize) -> SubscriptionManager {
    SubscriptionManager::new(Arc::new(MulticastSink::new(history_capacity)), 0)
}

/// Next record as text, failing the test after one second.
pub async fn next(sub: &mut Subscription) -> String {
    timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("timed out waiting for record")
        .expect("subscription closed")
        .to_string_lossy()
}

/// Let spawned forwarders run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Everything currently buffered, without waiting.
pub fn drain(sub: &mut Subscription) -> Vec<String> {
    let mut out = Vec::new();
    loop {
        match sub.try_recv() {
            Ok(record) => out.push(record.to_string_lossy()),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return out,
        }
    }
}

/// A record laid out the way the fan-out formatter writes one.
pub fn line(level: &str, msg: &str) -> String {
    format!("2026-01-01T00:00:00.000000Z {} log_relay: {}\n", level, msg)
}
