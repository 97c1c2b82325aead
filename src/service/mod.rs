//! The write and read paths over a `LogStore`.
pub mod ingest;
pub mod query;

pub use ingest::{IngestService, Receipt};
pub use query::QueryService;

/// Default upper bound on message length, in characters.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 10_000;
