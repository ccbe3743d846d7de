//! beacond - Racecar Beacon Daemon
//!
//! Serves the vehicle's identity, pose and obstacle flag to a remote client
//! over TCP and broadcasts pose + identity over UDP at a fixed rate.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: requests on 127.0.0.1:65432, broadcast to 127.255.255.255:65431 at 1 Hz
//! ./beacond
//!
//! # With a config file and the simulated producer
//! ./beacond --config beacon.toml --simulate
//! ```

use anyhow::{Context, Result};
use beacon_bridge::BridgeRuntime;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod config;
mod simulation;

use config::DaemonConfig;

#[derive(Parser, Debug)]
#[command(name = "beacond")]
#[command(version, about = "Racecar beacon daemon - live vehicle state over TCP and UDP")]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, env = "BEACON_CONFIG")]
    config: Option<String>,

    /// Request/response bind address
    #[arg(long)]
    host: Option<String>,

    /// Request/response TCP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Broadcast destination address
    #[arg(long)]
    broadcast_address: Option<String>,

    /// Broadcast destination UDP port
    #[arg(long)]
    broadcast_port: Option<u16>,

    /// Broadcast period in milliseconds
    #[arg(long)]
    period_ms: Option<u64>,

    /// Vehicle identity
    #[arg(long)]
    id: Option<u32>,

    /// Drive the state from the simulated producer
    #[arg(long)]
    simulate: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Command-line values override the config file
    fn apply(&self, config: &mut DaemonConfig) {
        let bridge = &mut config.bridge;
        if let Some(host) = &self.host {
            bridge.request.host = host.clone();
        }
        if let Some(port) = self.port {
            bridge.request.port = port;
        }
        if let Some(address) = &self.broadcast_address {
            bridge.broadcast.address = address.clone();
        }
        if let Some(port) = self.broadcast_port {
            bridge.broadcast.port = port;
        }
        if let Some(period_ms) = self.period_ms {
            bridge.broadcast.period_ms = period_ms;
        }
        if let Some(id) = self.id {
            bridge.vehicle.id = id;
        }
        if self.simulate {
            config.simulation.enabled = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        "beacond=debug,beacon_bridge=debug,beacon_core=debug"
    } else {
        "beacond=info,beacon_bridge=info,beacon_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from: {}", path);
            DaemonConfig::load(path)?
        }
        None => DaemonConfig::default(),
    };
    args.apply(&mut config);

    info!("Starting racecar beacon");

    let bridge = BridgeRuntime::start(&config.bridge)
        .await
        .context("Failed to start telemetry bridge")?;

    let producer_cancel = CancellationToken::new();
    let producer = if config.simulation.enabled {
        Some(tokio::spawn(simulation::run(
            config.simulation.clone(),
            bridge.updates(),
            producer_cancel.clone(),
        )))
    } else {
        info!("No producer attached; serving initial state");
        None
    };

    info!("Beacon ready - press Ctrl+C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C, shutting down");
    }
    info!("Shutting down...");

    producer_cancel.cancel();
    if let Some(handle) = producer {
        if let Err(e) = handle.await {
            warn!(error = %e, "Simulated producer ended abnormally");
        }
    }

    let stats = bridge.shutdown().await?;
    info!(
        connections = stats.connections,
        requests = stats.requests_served,
        rejected = stats.requests_rejected,
        broadcasts = stats.broadcasts_sent,
        "Beacon stopped"
    );
    Ok(())
}
