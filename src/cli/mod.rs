//! CLI module for insightql
//!
//! Provides command-line interface for:
//! - query: one-shot query from stdin
//! - serve: line-delimited queries from stdin until EOF
//! - list: loaded dataset summaries

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{boot, list, query, run, run_command, serve, Config, DatasetSource};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
