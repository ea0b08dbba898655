// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! netreplay-monitor: watches the host's connectivity through sysfs and logs
//! every transition and refresh request the replay dispatcher issues.

mod sysfs;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use nr_core::{Config, ConnectivityState};
use nr_dispatch::{RefreshSubscriber, ReplayDispatcher};
use nr_observer::ConnectivityObserver;
use tracing::{info, warn};

use sysfs::SysfsPlatform;

/// netreplay-monitor: connectivity observer for Linux hosts
#[derive(Parser, Debug)]
#[command(name = "netreplay-monitor")]
#[command(about = "Watch network connectivity and log replay activity")]
struct Args {
    /// Configuration file (defaults to <config dir>/netreplay/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print each published state to stdout as a JSON line
    #[arg(long)]
    json: bool,

    /// Override the sysfs poll interval, in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Root of the sysfs mount
    #[arg(long, default_value = "/sys")]
    sysfs: PathBuf,
}

struct LogRefresh;

impl RefreshSubscriber for LogRefresh {
    fn on_refresh_requested(&self) {
        info!("refresh requested");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if let Some(poll_ms) = args.poll_ms {
        config.observer.poll_interval_ms = poll_ms;
    }

    info!("Starting netreplay-monitor");
    info!("  sysfs: {}", args.sysfs.display());
    info!("  Poll interval: {}ms", config.observer.poll_interval_ms);
    info!(
        "  Replay: {} retries, {}ms stagger, {}ms settle",
        config.replay.max_retries, config.replay.stagger_ms, config.replay.settle_ms
    );

    let platform = Arc::new(SysfsPlatform::new(&args.sysfs, config.observer.poll_interval()));
    let observer = Arc::new(ConnectivityObserver::new(platform, config.observer.clone())?);
    let dispatcher = ReplayDispatcher::new(config.replay.clone())?;
    dispatcher.initialize(Arc::clone(&observer));

    let refresh = Arc::new(LogRefresh);
    dispatcher.register_refresh_subscriber(&refresh);

    observer.register();
    match observer.active_strategy() {
        Some(strategy) => info!("  Detection: {}", strategy),
        None => warn!("no detection strategy attached; state will not update"),
    }

    let mut states = observer.watch();
    let json = args.json;
    let printer = tokio::spawn(async move {
        loop {
            let state = *states.borrow_and_update();
            print_state(&state, json);
            if states.changed().await.is_err() {
                break;
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    dispatcher.shutdown();
    observer.unregister();
    printer.abort();

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_state(state: &ConnectivityState, json: bool) {
    if !json {
        println!("{}", state);
        return;
    }
    match serde_json::to_string(state) {
        Ok(line) => println!("{}", line),
        Err(e) => warn!("cannot encode state: {}", e),
    }
}
