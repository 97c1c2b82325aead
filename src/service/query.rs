//! Read path: the most recent records of the log stream.
use crate::error::ServiceError;
use crate::storage::LogStore;
use crate::types::{LogRecord, LOG_PARTITION, RECENT_LIMIT};
use std::sync::Arc;
use tracing::debug;

pub struct QueryService {
    store: Arc<dyn LogStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    /// Returns up to `RECENT_LIMIT` records, newest first, exactly as the
    /// store orders them.
    pub async fn recent(&self) -> Result<Vec<LogRecord>, ServiceError> {
        let records = self.store.query_recent(LOG_PARTITION, RECENT_LIMIT).await?;
        debug!("Retrieved {} log entries", records.len());
        Ok(records)
    }
}
