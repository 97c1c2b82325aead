//! Terminal dashboard: polls the query endpoint, renders statistics, an
//! hourly timeline and the recent entries, and submits new entries through
//! the ingest endpoint.
pub mod client;
mod input;
pub mod render;
pub mod runner;
pub mod state;

pub use client::ApiClient;
pub use runner::run_dashboard;
