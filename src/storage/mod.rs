//! This module defines the storage interface for log records and its `sled`
//! implementation.
pub mod records;

pub use records::{LogStore, SledLogStore};

#[cfg(test)]
pub mod testing {
    //! In-memory `LogStore` doubles for service and handler tests.
    use super::LogStore;
    use crate::error::StoreError;
    use crate::types::LogRecord;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Keeps records in a `Vec` and counts `put` calls.
    #[derive(Default)]
    pub struct CountingStore {
        records: Mutex<Vec<LogRecord>>,
        puts: AtomicUsize,
    }

    impl CountingStore {
        pub fn put_count(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LogStore for CountingStore {
        async fn put(&self, record: LogRecord) -> Result<(), StoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.records.lock().unwrap().push(record);
            Ok(())
        }

        async fn query_recent(
            &self,
            partition: &str,
            limit: usize,
        ) -> Result<Vec<LogRecord>, StoreError> {
            let mut records: Vec<LogRecord> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.partition == partition)
                .cloned()
                .collect();
            records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            records.truncate(limit);
            Ok(records)
        }
    }

    /// Fails every call.
    pub struct FailingStore;

    #[async_trait]
    impl LogStore for FailingStore {
        async fn put(&self, _record: LogRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk offline".to_string()))
        }

        async fn query_recent(
            &self,
            _partition: &str,
            _limit: usize,
        ) -> Result<Vec<LogRecord>, StoreError> {
            Err(StoreError::Unavailable("disk offline".to_string()))
        }
    }
}
