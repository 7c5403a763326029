//! CLI module for Taler.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Taler - Speaker-Diarized Transcription
///
/// A resumable batch pipeline that turns raw recordings into
/// speaker-labeled transcripts. The name "Taler" comes from the
/// Norwegian/Scandinavian word for "speaker."
#[derive(Parser, Debug)]
#[command(name = "taler")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Taler and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Process items through the pipeline
    Run {
        /// Item ids to process; every item in the data directory when empty
        ids: Vec<String>,

        /// Recognition mode (diarized, whole)
        #[arg(short, long, default_value = "diarized")]
        mode: String,

        /// Worker pool size override (0 = auto)
        #[arg(short, long)]
        workers: Option<usize>,
    },
}
