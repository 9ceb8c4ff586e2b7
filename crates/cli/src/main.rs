//! kubectl-rltop
//!
//! A kubectl plugin that shows resource usage next to the requests and
//! limits declared for pods and nodes.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{node, pod};
use rltop_lib::KubeSource;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Display resource usage together with requests and limits
#[derive(Parser)]
#[command(name = "kubectl-rltop")]
#[command(author, version, about = "Display resource usage, requests and limits of pods and nodes", long_about = None)]
pub struct Cli {
    /// Path to the kubeconfig file to use
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Name of the kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true)]
    pub output: Option<output::OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show usage, requests and limits of pods
    #[command(visible_aliases = ["pods", "po"])]
    Pod(pod::PodArgs),

    /// Show usage, requests and limits of nodes
    #[command(visible_aliases = ["nodes", "no"])]
    Node(node::NodeArgs),

    /// Print version information
    Version,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    if let Commands::Version = cli.command {
        println!(
            "kubectl-rltop {} ({}/{})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        return Ok(());
    }

    let config = config::Config::load()?;
    let format = cli.output.or(config.format).unwrap_or_default();
    debug!(?config, ?format, "Configuration loaded");

    let client = client::connect(cli.kubeconfig.as_deref(), cli.context.as_deref()).await?;
    let source = KubeSource::new(client);

    match cli.command {
        Commands::Pod(args) => pod::run(&source, args, &config, format).await?,
        Commands::Node(args) => node::run(&source, args, &config, format).await?,
        Commands::Version => {}
    }

    Ok(())
}
