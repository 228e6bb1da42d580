//! PostureLens CLI
//!
//! Command-line interface for posture monitoring over pose landmark streams.
//!
//! # Features
//!
//! - **replay**: Evaluate a recorded JSONL session frame by frame
//! - **simulate**: Run a deterministic bend-and-recover sweep
//! - **angle**: Compute one hip angle from raw coordinates
//! - **version**: Display version information
//!
//! # Usage
//!
//! ```bash
//! # Replay a recorded session and print the report
//! posturelens replay session.jsonl
//!
//! # Replay with a stricter threshold, exporting assessments as CSV
//! posturelens replay session.jsonl -t 150 --output out.csv --output-format csv
//!
//! # Simulate ten seconds of paced frames with a progress bar
//! posturelens simulate -n 300 --interval 33 --progress
//!
//! # Classify a single triple of coordinates
//! posturelens angle --shoulder 0.52,0.31 --hip 0.50,0.62 --knee 0.49,0.93
//! ```

use clap::{Parser, Subcommand};

pub mod session;

/// PostureLens Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "posturelens")]
#[command(author, version, about = "Posture monitoring over pose landmark streams")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded JSONL session
    Replay(session::ReplayArgs),

    /// Run a deterministic synthetic session
    Simulate(session::SimulateArgs),

    /// Compute one hip angle from raw coordinates
    Angle(session::AngleArgs),

    /// Display version information
    Version,
}
