//! CLI module for nodequery
//!
//! Provides command-line interface for:
//! - query: One-shot query over nodes loaded from a file
//! - shape: Derived filter shape of a type

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute_request, load_engine, query, run, run_command, shape};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_request_from, write_error, write_response};
