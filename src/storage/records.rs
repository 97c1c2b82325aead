//! This module defines the storage interface and the `sled` implementation for
//! log records.
use crate::error::StoreError;
use crate::types::LogRecord;
use async_trait::async_trait;
use sled::Db;

/// A trait for persisting and reading log records.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Inserts a new record.
    ///
    /// No uniqueness check is made; the caller is responsible for generating
    /// a unique `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the record cannot be persisted.
    async fn put(&self, record: LogRecord) -> Result<(), StoreError>;

    /// Retrieves up to `limit` records of `partition`, newest first.
    ///
    /// Returns an empty `Vec` when the partition holds no records.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the records cannot be read.
    async fn query_recent(&self, partition: &str, limit: usize)
        -> Result<Vec<LogRecord>, StoreError>;
}

/// A `LogStore` implementation using `sled` for storage.
pub struct SledLogStore {
    tree: sled::Tree,
}

impl SledLogStore {
    /// Creates a new `SledLogStore` backed by the tree named `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying `sled` tree cannot be opened.
    pub fn new(db: Db, table: &str) -> Result<Self, StoreError> {
        let tree = db.open_tree(table)?;
        Ok(Self { tree })
    }

    /// Prefix shared by every key of a partition.
    fn partition_prefix(partition: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(partition.len() + 1);
        prefix.extend_from_slice(partition.as_bytes());
        prefix.push(0);
        prefix
    }

    /// Creates a composite key: partition prefix, timestamp and id.
    ///
    /// The millisecond timestamp has its sign bit flipped so that big-endian
    /// byte order matches numeric order for pre-epoch times as well.
    fn make_composite_key(record: &LogRecord) -> Vec<u8> {
        let millis = (record.timestamp.timestamp_millis() as u64) ^ (1 << 63);
        let mut key = Self::partition_prefix(&record.partition);
        key.extend_from_slice(&millis.to_be_bytes());
        key.extend_from_slice(record.id.as_bytes());
        key
    }
}

#[async_trait]
impl LogStore for SledLogStore {
    async fn put(&self, record: LogRecord) -> Result<(), StoreError> {
        let key = Self::make_composite_key(&record);
        let value = serde_json::to_vec(&record)?;

        self.tree.insert(key, value)?;
        self.tree.flush_async().await?;
        Ok(())
    }

    async fn query_recent(
        &self,
        partition: &str,
        limit: usize,
    ) -> Result<Vec<LogRecord>, StoreError> {
        let tree = self.tree.clone();
        let prefix = Self::partition_prefix(partition);

        tokio::task::spawn_blocking(move || -> Result<Vec<LogRecord>, StoreError> {
            let mut records = Vec::new();
            // Reverse iteration over the prefix yields newest first.
            for result in tree.scan_prefix(&prefix).rev().take(limit) {
                let (_key, value) = result?;
                records.push(serde_json::from_slice(&value)?);
            }
            Ok(records)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::{LogStore, SledLogStore};
    use crate::types::{LogRecord, Severity, LOG_PARTITION};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::tempdir;
    use uuid::Uuid;

    fn record_at(partition: &str, timestamp: DateTime<Utc>, message: &str) -> LogRecord {
        LogRecord {
            partition: partition.to_string(),
            timestamp,
            id: Uuid::new_v4(),
            severity: Severity::Info,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn empty_partition_returns_nothing() {
        let dir = tempdir().unwrap();
        let store = SledLogStore::new(sled::open(dir.path()).unwrap(), "logs").unwrap();

        let records = store.query_recent(LOG_PARTITION, 100).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn query_is_newest_first_regardless_of_insert_order() {
        let dir = tempdir().unwrap();
        let store = SledLogStore::new(sled::open(dir.path()).unwrap(), "logs").unwrap();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        for offset in [3, 1, 4, 0, 2] {
            let record = record_at(LOG_PARTITION, base + Duration::seconds(offset), &offset.to_string());
            store.put(record).await.unwrap();
        }

        let messages: Vec<String> = store
            .query_recent(LOG_PARTITION, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(messages, vec!["4", "3", "2", "1", "0"]);
    }

    #[tokio::test]
    async fn limit_keeps_the_most_recent() {
        let dir = tempdir().unwrap();
        let store = SledLogStore::new(sled::open(dir.path()).unwrap(), "logs").unwrap();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        for i in 0..10 {
            store
                .put(record_at(LOG_PARTITION, base + Duration::minutes(i), &i.to_string()))
                .await
                .unwrap();
        }

        let records = store.query_recent(LOG_PARTITION, 3).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].message, "9");
        assert_eq!(records[2].message, "7");
    }

    #[tokio::test]
    async fn same_millisecond_records_are_both_kept() {
        let dir = tempdir().unwrap();
        let store = SledLogStore::new(sled::open(dir.path()).unwrap(), "logs").unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        store.put(record_at(LOG_PARTITION, ts, "a")).await.unwrap();
        store.put(record_at(LOG_PARTITION, ts, "b")).await.unwrap();

        assert_eq!(store.query_recent(LOG_PARTITION, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn partitions_and_tables_are_isolated() {
        let dir = tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledLogStore::new(db.clone(), "logs").unwrap();
        let other_table = SledLogStore::new(db, "audit").unwrap();
        let ts = Utc::now();

        store.put(record_at(LOG_PARTITION, ts, "kept")).await.unwrap();
        // "LOGS2" shares the textual prefix "LOGS" but not the key prefix.
        store.put(record_at("LOGS2", ts, "other")).await.unwrap();

        let records = store.query_recent(LOG_PARTITION, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept");
        assert!(other_table.query_recent(LOG_PARTITION, 10).await.unwrap().is_empty());
    }
}
