//! Validation and persistence of incoming log entries.
use crate::error::ServiceError;
use crate::storage::LogStore;
use crate::types::{LogRecord, Severity, LOG_PARTITION};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

pub const MISSING_FIELDS: &str = "Missing required fields: severity and message are required";
pub const INVALID_SEVERITY: &str = "Invalid severity. Must be one of: info, warning, error";

/// Identifier and timestamp assigned to a stored record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Receipt {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
}

pub struct IngestService {
    store: Arc<dyn LogStore>,
    max_message_len: usize,
}

impl IngestService {
    pub fn new(store: Arc<dyn LogStore>, max_message_len: usize) -> Self {
        Self {
            store,
            max_message_len,
        }
    }

    /// Validates a severity/message pair and writes it as a new record.
    ///
    /// Validation failures return before the store is touched.
    pub async fn submit(
        &self,
        severity: Option<&str>,
        message: Option<&str>,
    ) -> Result<Receipt, ServiceError> {
        let (severity, message) = match (severity, message) {
            (Some(s), Some(m)) if !s.is_empty() && !m.is_empty() => (s, m),
            _ => return Err(ServiceError::Validation(MISSING_FIELDS.to_string())),
        };

        let severity: Severity = severity.parse().map_err(|e| {
            debug!("Rejected ingest: {}", e);
            ServiceError::Validation(INVALID_SEVERITY.to_string())
        })?;

        if message.chars().count() > self.max_message_len {
            return Err(ServiceError::Validation(format!(
                "Message exceeds maximum length of {} characters",
                self.max_message_len
            )));
        }

        let record = LogRecord {
            partition: LOG_PARTITION.to_string(),
            timestamp: now_millis(),
            id: Uuid::new_v4(),
            severity,
            message: message.to_string(),
        };
        let receipt = Receipt {
            id: record.id,
            timestamp: record.timestamp,
        };

        if let Err(e) = self.store.put(record).await {
            error!("Failed to store log entry {}: {}", receipt.id, e);
            return Err(e.into());
        }

        info!("Stored log entry {} ({})", receipt.id, severity);
        Ok(receipt)
    }
}

/// Current time truncated to the millisecond precision records carry.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
