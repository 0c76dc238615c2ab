//! CLI argument definitions.

use clap::Parser;

use crate::commands::Command;

/// Default API base URL (a local development server).
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// Command-line client for the evently event-management API.
#[derive(Parser, Debug)]
#[command(name = "evently")]
#[command(author, version = env!("EVENTLY_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(long, global = true, env = "EVENTLY_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}
