//! CLI command handling.

use std::time::Duration;

use clap::Subcommand;
use ebbtide_core::{SwarmConfig, SwarmHandle};
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a swarm simulation and report statistics
    Run {
        /// Seed for the deterministic random source
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Plain nodes to start with
        #[arg(long, default_value_t = 20)]
        nodes: usize,

        /// Full seeds to start with
        #[arg(long, default_value_t = 1)]
        seeds: usize,

        /// Partial seeds (each piece owned with probability 0.5)
        #[arg(long, default_value_t = 0)]
        partial_seeds: usize,

        /// Enable autonomous population dynamics
        #[arg(long)]
        demo: bool,

        /// Place seeds on a separate inner ring
        #[arg(long)]
        inner_circle: bool,

        /// Number of ticks to simulate
        #[arg(long, default_value_t = 5000)]
        ticks: u64,

        /// Print the statistics line every N ticks (0 = never)
        #[arg(long, default_value_t = 500)]
        stats_every: u64,

        /// Wall-clock milliseconds between ticks (0 = run flat out)
        #[arg(long, default_value_t = 0)]
        tick_ms: u64,

        /// Print the final statistics as JSON instead of the summary line
        #[arg(long)]
        json: bool,
    },
}

/// Dispatches a parsed command.
///
/// # Errors
/// - `anyhow::Error` - JSON serialization of the final report failed
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            seed,
            nodes,
            seeds,
            partial_seeds,
            demo,
            inner_circle,
            ticks,
            stats_every,
            tick_ms,
            json,
        } => {
            let config = SwarmConfig {
                seed,
                demo_mode: demo,
                distinct_inner_circle: inner_circle,
                ..SwarmConfig::default()
            };
            let handle = SwarmHandle::new(config);

            for _ in 0..seeds {
                handle.add_seed(false);
            }
            for _ in 0..partial_seeds {
                handle.add_seed(true);
            }
            for _ in 0..nodes {
                handle.add_node();
            }
            info!(
                seed,
                nodes = handle.node_count(),
                ticks,
                "starting simulation"
            );

            let mut interval =
                (tick_ms > 0).then(|| tokio::time::interval(Duration::from_millis(tick_ms)));

            for tick in 1..=ticks {
                if let Some(interval) = interval.as_mut() {
                    interval.tick().await;
                }
                handle.step();

                if stats_every > 0 && tick % stats_every == 0 {
                    info!("[{tick:>6}] {}", handle.statistics());
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&handle.stats())?);
            } else {
                println!("{}", handle.statistics());
            }

            Ok(())
        }
    }
}
