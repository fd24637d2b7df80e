//! CLI argument definitions using clap
//!
//! Commands:
//! - nodequery query --schema <path> --nodes <path> [--config <path>]
//! - nodequery shape --schema <path> --type <name>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nodequery - filter, sort and project in-memory content nodes
#[derive(Parser, Debug)]
#[command(name = "nodequery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single query read from stdin and exit
    Query {
        /// Path to the type definitions file
        #[arg(long)]
        schema: PathBuf,

        /// Path to a JSON array of nodes
        #[arg(long)]
        nodes: PathBuf,

        /// Path to engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the derived filter input shape of a type
    Shape {
        /// Path to the type definitions file
        #[arg(long)]
        schema: PathBuf,

        /// Type name
        #[arg(long = "type")]
        type_name: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
