//! One-shot command-line operations against the ingest and query endpoints.
pub mod commands;
