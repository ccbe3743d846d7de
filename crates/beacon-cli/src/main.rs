//! beacon-cli - Command-line tool for a racecar beacon
//!
//! Queries a beacon's request/response channel or follows its broadcast.

mod commands;
mod output;

use std::net::SocketAddr;

use anyhow::Result;
use beacon_client::RemoteClient;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::query::Target;
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "beacon-cli")]
#[command(author, version, about = "Racecar beacon CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Beacon request/response address
    #[arg(short, long, env = "BEACON_SERVER", default_value = "127.0.0.1:65432")]
    server: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query identity, position or obstacle flag
    Query {
        /// What to query
        #[arg(value_enum, required_unless_present = "interactive")]
        targets: Vec<Target>,

        /// Read tags from stdin instead
        #[arg(short, long, conflicts_with = "targets")]
        interactive: bool,

        /// Also print each reply record as hex
        #[arg(long)]
        raw: bool,
    },

    /// Follow the periodic position broadcast
    Track {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:65431")]
        bind: SocketAddr,

        /// Stop after this many records
        #[arg(short = 'n', long)]
        count: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    match cli.command {
        Commands::Query {
            targets,
            interactive,
            raw,
        } => {
            let ctx = OutputContext::new(cli.output, cli.no_color, cli.quiet, raw);
            let mut client = RemoteClient::connect(cli.server.as_str()).await?;
            let result = if interactive {
                commands::interactive(&mut client, &ctx).await
            } else {
                commands::query(&mut client, &targets, &ctx).await
            };
            if let Err(e) = client.close().await {
                ctx.error(&format!("Failed to close connection: {}", e));
            }
            result?;
        }

        Commands::Track { bind, count } => {
            let ctx = OutputContext::new(cli.output, cli.no_color, cli.quiet, false);
            commands::track(bind, count, &ctx).await?;
        }
    }

    Ok(())
}
