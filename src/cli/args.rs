//! CLI argument definitions using clap
//!
//! Commands:
//! - tableforge init --config <path>
//! - tableforge serve --config <path> [--port <port>]
//! - tableforge validate <file>
//! - tableforge plan <file>
//! - tableforge create <file> --creator <id> --config <path>
//! - tableforge list --config <path>
//! - tableforge delete <id> --config <path>
//! - tableforge orphans --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// tableforge - materialize table definitions as audited PostgreSQL tables
#[derive(Parser, Debug)]
#[command(name = "tableforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the metadata catalog and required extensions
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./tableforge.json")]
        config: PathBuf,
    },

    /// Start the admin HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./tableforge.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a table definition file without touching the database
    Validate {
        /// JSON table definition
        file: PathBuf,
    },

    /// Print the DDL a definition would execute
    Plan {
        /// JSON table definition
        file: PathBuf,
    },

    /// Create a table from a definition file
    Create {
        /// JSON table definition
        file: PathBuf,

        /// Creator identity recorded in metadata
        #[arg(long, default_value = "system")]
        creator: String,

        /// Path to configuration file
        #[arg(long, default_value = "./tableforge.json")]
        config: PathBuf,
    },

    /// List custom tables
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./tableforge.json")]
        config: PathBuf,
    },

    /// Delete a custom table and its history
    Delete {
        /// Table id
        id: Uuid,

        /// Path to configuration file
        #[arg(long, default_value = "./tableforge.json")]
        config: PathBuf,
    },

    /// Report physical tables with no metadata row
    Orphans {
        /// Path to configuration file
        #[arg(long, default_value = "./tableforge.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
