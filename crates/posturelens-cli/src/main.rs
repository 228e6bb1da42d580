//! PostureLens CLI Entry Point
//!
//! This is the main entry point for the posturelens command-line tool.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use posturelens_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the verbosity flag
    let default_directive = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Replay(args) => {
            posturelens_cli::session::execute_replay(args).await?;
        }
        Commands::Simulate(args) => {
            posturelens_cli::session::execute_simulate(args).await?;
        }
        Commands::Angle(args) => {
            posturelens_cli::session::execute_angle(args)?;
        }
        Commands::Version => {
            println!("posturelens {}", env!("CARGO_PKG_VERSION"));
            println!("core version: {}", posturelens_core::VERSION);
            println!("engine version: {}", posturelens_engine::VERSION);
        }
    }

    Ok(())
}
