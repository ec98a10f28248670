//! Ebbtide CLI - headless swarm simulation driver.
//!
//! Plays the role the rendering event loop plays in a graphical frontend:
//! it owns the wall-clock cadence and forwards commands, while all
//! simulation logic lives in `ebbtide-core`.

mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ebbtide")]
#[command(about = "A peer-to-peer content-distribution swarm simulator")]
struct Cli {
    /// Log filter, e.g. "info" or "ebbtide_core=debug"
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    commands::handle_command(cli.command).await
}
