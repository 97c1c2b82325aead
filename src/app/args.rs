use clap::{Args, Parser, Subcommand};

use crate::service::DEFAULT_MAX_MESSAGE_LEN;

#[derive(Parser, Debug, Clone)]
#[command(name = "logboard")]
#[command(about = "Log ingestion service with a polling dashboard")]
pub struct AppArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the ingest and query endpoints and the web dashboard
    Serve(ServeArgs),
    /// Open the terminal dashboard
    Dashboard(DashboardArgs),
    /// Submit a single log entry
    Submit(SubmitArgs),
    /// Print the most recent log entries
    Recent(RecentArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080, help = "Port to listen on")]
    pub port: u16,

    #[arg(long, default_value = "127.0.0.1", help = "IPv4 or IPv6 address to bind")]
    pub host: String,

    #[arg(long, default_value = "data", help = "Data directory")]
    pub data_dir: String,

    #[arg(long, help = "Table holding the log records (or set LOGBOARD_TABLE)")]
    pub table: Option<String>,

    #[arg(
        long,
        default_value_t = DEFAULT_MAX_MESSAGE_LEN,
        help = "Maximum message length in characters"
    )]
    pub max_message_len: usize,
}

#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    #[arg(long, help = "Ingest endpoint URL (or set LOGBOARD_INGEST_URL)")]
    pub ingest_url: Option<String>,

    #[arg(long, help = "Query endpoint URL (or set LOGBOARD_QUERY_URL)")]
    pub query_url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub endpoints: EndpointArgs,

    #[arg(long, default_value = "dashboard.log", help = "File receiving dashboard logs")]
    pub log_file: String,
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    #[arg(long, help = "Ingest endpoint URL (or set LOGBOARD_INGEST_URL)")]
    pub ingest_url: Option<String>,

    #[arg(long, short, default_value = "info", help = "info, warning or error")]
    pub severity: String,

    #[arg(help = "Log message")]
    pub message: String,
}

#[derive(Args, Debug, Clone)]
pub struct RecentArgs {
    #[arg(long, help = "Query endpoint URL (or set LOGBOARD_QUERY_URL)")]
    pub query_url: Option<String>,

    #[arg(long, short = 'n', help = "Show at most this many entries")]
    pub limit: Option<usize>,
}

impl AppArgs {
    pub fn from_cli() -> Self {
        <Self as Parser>::parse()
    }
}
