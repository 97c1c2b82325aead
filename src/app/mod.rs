pub mod args;
mod server;
mod setup;

pub use args::AppArgs;

use crate::cli::commands;
use crate::dashboard::{self, ApiClient};
use anyhow::Result;
use args::Command;

pub async fn launch() -> Result<()> {
    launch_with_args(AppArgs::from_cli()).await
}

pub async fn launch_with_args(args: AppArgs) -> Result<()> {
    match args.command {
        Command::Serve(serve) => {
            setup::configure_logging();
            server::run(serve).await
        }
        Command::Dashboard(dash) => {
            let ingest_url = setup::ingest_url(dash.endpoints.ingest_url.as_deref())?;
            let query_url = setup::query_url(dash.endpoints.query_url.as_deref())?;
            setup::configure_file_logging(&dash.log_file)?;

            let client = ApiClient::new(ingest_url, query_url)?;
            dashboard::run_dashboard(client).await
        }
        Command::Submit(submit) => {
            setup::configure_logging();
            let ingest_url = setup::ingest_url(submit.ingest_url.as_deref())?;
            let client = ApiClient::new(ingest_url.clone(), ingest_url)?;
            commands::submit(&client, &submit.severity, &submit.message).await
        }
        Command::Recent(recent) => {
            setup::configure_logging();
            let query_url = setup::query_url(recent.query_url.as_deref())?;
            let client = ApiClient::new(query_url.clone(), query_url)?;
            commands::recent(&client, recent.limit).await
        }
    }
}
