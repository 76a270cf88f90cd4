//! netmedicctl - Network diagnosis and repair from the command line
//!
//! Runs the netmedic probes and repairs in-process. Ctrl-C cancels the
//! current run; partial results are still printed.

mod commands;
mod errors;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netmedic_common::NetmedicConfig;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "netmedicctl")]
#[command(about = "Diagnose and repair host network problems", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: <config_dir>/netmedic/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered checks and repairs
    List,

    /// Run diagnostic checks
    Diagnose {
        /// Run only this check
        #[arg(long)]
        id: Option<String>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Run repair actions
    Repair {
        /// Repair to run
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<String>,

        /// Run every repair in order
        #[arg(long)]
        all: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Run all checks and write a JSON report
    Report {
        /// Report directory (default: ~/.netmedic/reports)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// One-shot network tools
    Tool {
        #[command(subcommand)]
        tool: ToolCommands,
    },
}

#[derive(Subcommand)]
enum ToolCommands {
    /// Send four echo requests
    Ping { target: String },

    /// Trace the route to a host (max 15 hops)
    Trace { target: String },

    /// Check whether a TCP port accepts connections
    Port { host: String, port: u16 },

    /// Full adapter configuration
    Info,

    /// Firewall state for all profiles
    Firewall,

    /// Set DNS servers on every connected adapter
    SwitchDns {
        /// Public resolver preset (alidns, 114dns, dnspod, google, cloudflare)
        #[arg(long, conflicts_with_all = ["primary", "secondary"])]
        preset: Option<String>,

        #[arg(required_unless_present = "preset")]
        primary: Option<String>,

        #[arg(required_unless_present = "preset")]
        secondary: Option<String>,
    },

    /// Restart the DHCP, DNS client and network location services
    RestartServices,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NetmedicConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => NetmedicConfig::load().context("Failed to load config")?,
    };

    init_logging(&config, cli.verbose);
    debug!("netmedicctl v{} starting", env!("CARGO_PKG_VERSION"));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling current run");
            on_interrupt.cancel();
        }
    });

    let code = match cli.command {
        Commands::List => commands::list(config).await?,
        Commands::Diagnose { id, json } => commands::diagnose(config, id, json, &cancel).await?,
        Commands::Repair { id, all, json } => {
            let target = if all { None } else { id };
            commands::repair(config, target, json, &cancel).await?
        }
        Commands::Report { out } => commands::report(config, out, &cancel).await?,
        Commands::Tool { tool } => commands::tool(config, tool, &cancel).await?,
    };

    std::process::exit(code);
}

/// RUST_LOG wins; otherwise `--verbose` or the configured level
fn init_logging(config: &NetmedicConfig, verbose: bool) {
    let fallback = if verbose { "debug" } else { config.log.level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
