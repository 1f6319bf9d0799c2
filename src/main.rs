//! log-relay daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!  tracing events / facade ──▶ subscriber ──┬──▶ console
//!                                           ├──▶ file
//!                                           └──▶ MulticastSink ──┬──▶ history ring
//!                                                                └──▶ subscribers ──▶ --tail
//!
//!  config file ──▶ ConfigWatcher ──▶ LogService::apply_config (level reload)
//!  SIGINT/SIGTERM ──▶ Shutdown ──▶ background loops exit
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use log_relay::config::{load_config, ConfigWatcher, RelayConfig};
use log_relay::errors::{named_scope, CodedError};
use log_relay::lifecycle::{signals, Shutdown, ShutdownSignal};
use log_relay::observability::{facade, metrics, Field};
use log_relay::service::{global, Configurable, LogService, Subscribable};
use log_relay::SubscribeOptions;

#[derive(Parser)]
#[command(name = "log-relay", version)]
#[command(about = "Logging service with in-memory history and live log subscriptions", long_about = None)]
struct Cli {
    /// TOML config file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mirror the fan-out stream to stderr.
    #[arg(long)]
    tail: bool,

    /// Records of history to replay when tailing.
    #[arg(long, default_value_t = 20)]
    replay: usize,

    /// Minimum level when tailing (empty for all).
    #[arg(long, default_value = "")]
    min_level: String,

    /// Emit a heartbeat record every N seconds (0 disables).
    #[arg(long, default_value_t = 0)]
    heartbeat_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    let service = global::init(config.logger.clone())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.logger.level,
        history_capacity = config.logger.fanout.history_capacity,
        "log-relay starting"
    );

    if config.metrics.enabled {
        match config.metrics.address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => facade::report(
                "Failed to parse metrics address",
                &CodedError::wrap_system(e),
                &[named_scope("metrics")],
            ),
        }
    }

    let shutdown = Shutdown::new();
    let mut tasks = Vec::new();

    // Dropping the watcher stops notifications, so it lives until main returns.
    let _watcher = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            match watcher.run() {
                Ok(watcher) => {
                    tasks.push(tokio::spawn(apply_updates(
                        service.clone(),
                        updates,
                        shutdown.subscribe(),
                    )));
                    Some(watcher)
                }
                Err(e) => {
                    tracing::error!(error = %e, path = ?path, "Failed to start config watcher");
                    None
                }
            }
        }
        None => None,
    };

    if cli.tail {
        let opts = SubscribeOptions::new()
            .with_replay(cli.replay)
            .with_min_level_str(&cli.min_level);
        tasks.push(tokio::spawn(tail(service.clone(), opts, shutdown.subscribe())));
    }

    if cli.heartbeat_secs > 0 {
        tasks.push(tokio::spawn(heartbeat(
            service.clone(),
            Duration::from_secs(cli.heartbeat_secs),
            shutdown.subscribe(),
        )));
    }

    signals::wait_for_shutdown(&shutdown).await;

    for task in tasks {
        let _ = task.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn apply_updates(
    service: Arc<LogService>,
    mut updates: mpsc::UnboundedReceiver<RelayConfig>,
    mut shutdown: ShutdownSignal,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                match service.apply_config(config.logger) {
                    Ok(true) => tracing::info!("Logger configuration applied"),
                    Ok(false) => {}
                    Err(e) => tracing::error!(error = %e, "Failed to apply logger configuration"),
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

async fn tail(service: Arc<LogService>, opts: SubscribeOptions, mut shutdown: ShutdownSignal) {
    let mut subscription = service.subscribe(opts);
    let mut stderr = std::io::stderr();

    loop {
        tokio::select! {
            record = subscription.recv() => {
                let Some(record) = record else { break };
                if stderr.write_all(&record).is_err() {
                    break;
                }
            }
            _ = shutdown.recv() => break,
        }
    }
    subscription.cancel();
}

async fn heartbeat(service: Arc<LogService>, period: Duration, mut shutdown: ShutdownSignal) {
    let mut ticker = tokio::time::interval(period);
    let mut beat: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                beat += 1;
                facade::info(
                    "heartbeat",
                    &[
                        Field::uint("beat", beat),
                        Field::uint("subscribers", service.sink().subscriber_count() as u64),
                        Field::uint("history", service.sink().history_len() as u64),
                    ],
                );
            }
            _ = shutdown.recv() => break,
        }
    }
}
