//! The main entry point for the logboard application.
mod app;
mod cli;
mod dashboard;
mod error;
mod service;
mod storage;
mod types;
mod web;

use anyhow::Result;

/// The main function of the application.
///
/// Parses the command line and runs the selected mode: the log service,
/// the terminal dashboard, or a one-shot submit/recent call.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, or if the
/// selected mode fails.
#[tokio::main]
async fn main() -> Result<()> {
    app::launch().await
}
