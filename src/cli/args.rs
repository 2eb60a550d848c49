//! CLI argument definitions using clap
//!
//! Commands:
//! - insightql query --config <path>
//! - insightql serve --config <path>
//! - insightql list --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// insightql - JSON queries over course and room datasets
#[derive(Parser, Debug)]
#[command(name = "insightql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load datasets, run one query from stdin and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./insightql.json")]
        config: PathBuf,
    },

    /// Load datasets, then answer one query per stdin line until EOF
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./insightql.json")]
        config: PathBuf,
    },

    /// Load datasets and print their summaries
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./insightql.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
