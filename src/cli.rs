//! CLI argument parsing for the poolroute-worker binary.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::types::SequenceMode;

#[derive(Parser)]
#[command(name = "poolroute-worker", about = "Route sequencing worker for pool-service scheduling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Sequence every route of a date and exit
    OptimizeDay {
        /// Date in YYYY-MM-DD format
        #[arg(long)]
        date: NaiveDate,
        /// Discard existing orders instead of extending them
        #[arg(long)]
        rebuild: bool,
    },
}

impl Command {
    pub fn sequence_mode(&self) -> SequenceMode {
        match self {
            Command::OptimizeDay { rebuild: true, .. } => SequenceMode::Rebuild,
            _ => SequenceMode::Extend,
        }
    }
}
