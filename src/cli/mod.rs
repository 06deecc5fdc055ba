//! CLI module for tableforge
//!
//! Provides command-line interface for:
//! - init: Create the metadata catalog
//! - serve: Run the admin HTTP API
//! - validate / plan: Offline checks of a definition file
//! - create / list / delete / orphans: Table management

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{create, delete, init, list, orphans, plan, run, run_command, serve, validate};
pub use config::{ServiceConfig, DATABASE_URL_ENV};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_definition, write_error, write_response};
