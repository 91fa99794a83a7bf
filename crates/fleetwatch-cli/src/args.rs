use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fleetwatch_client::http::DEFAULT_BASE_URL;
use fleetwatch_common::{ServerStatus, StatusFilter};
use fleetwatch_dashboard::ReportFormat;

#[derive(Debug, Parser)]
#[command(name = "fleetwatch")]
#[command(about = "Monitor and manage a fleet of servers", long_about = None)]
pub struct Args {
    /// Base URL of the server inventory API
    #[arg(long, env = "FLEETWATCH_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "FLEETWATCH_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Run against an in-memory fleet instead of the API
    #[arg(long)]
    pub demo: bool,

    /// OTLP endpoint for exporting traces
    #[arg(long, env = "FLEETWATCH_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Bearer token for the OTLP endpoint
    #[arg(long, env = "FLEETWATCH_OTLP_TOKEN")]
    pub otlp_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all servers, newest first
    List,
    /// Ping a server by IP address and show the refreshed list
    Ping { ip_address: String },
    /// Register a new server
    Save {
        #[arg(long)]
        name: String,
        #[arg(long = "ip")]
        ip_address: String,
        #[arg(long)]
        memory: String,
        #[arg(long = "type")]
        server_type: String,
        /// SERVER_UP or SERVER_DOWN
        #[arg(long, default_value = "SERVER_DOWN")]
        status: ServerStatus,
    },
    /// Delete a server by id
    Delete { id: i64 },
    /// Show only servers with the given status (ALL, SERVER_UP, SERVER_DOWN)
    Filter { status: StatusFilter },
    /// Export the server list (excel writes server-report.xls, pdf prints)
    Report {
        format: ReportFormat,
        /// Directory for the exported file
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Interactive dashboard session
    Console,
}
