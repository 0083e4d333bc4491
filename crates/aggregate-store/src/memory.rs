use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{AggregateId, AggregateRecord, Result, store::AggregateStore};

/// In-memory aggregate store implementation.
///
/// Provides the same interface as the PostgreSQL implementation and
/// additionally counts writes, which lets tests assert that a rejected
/// operation never reached the store.
#[derive(Clone, Default)]
pub struct InMemoryAggregateStore {
    records: Arc<RwLock<HashMap<AggregateId, AggregateRecord>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryAggregateStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of aggregates stored.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns how many times `save` has been called successfully.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Resets the write counter, keeping the records.
    ///
    /// Lets tests seed data and then count only the writes that follow.
    pub fn reset_write_count(&self) {
        self.writes.store(0, Ordering::SeqCst);
    }

    /// Clears all records and resets the write counter.
    pub async fn clear(&self) {
        self.records.write().await.clear();
        self.writes.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl AggregateStore for InMemoryAggregateStore {
    async fn save(&self, record: AggregateRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.aggregate_id, record);
        self.writes.fetch_add(1, Ordering::SeqCst);
        metrics::counter!("aggregate_store_writes_total").increment(1);
        Ok(())
    }

    async fn load(&self, aggregate_id: AggregateId) -> Result<Option<AggregateRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&aggregate_id).cloned())
    }

    async fn load_all(&self, aggregate_type: &str) -> Result<Vec<AggregateRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<_> = records
            .values()
            .filter(|r| r.aggregate_type == aggregate_type)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.aggregate_id);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AggregateStoreExt;

    fn create_test_record(aggregate_id: AggregateId, aggregate_type: &str) -> AggregateRecord {
        AggregateRecord::new(
            aggregate_id,
            aggregate_type,
            serde_json::json!({"name": "test"}),
        )
    }

    #[tokio::test]
    async fn save_and_load() {
        let store = InMemoryAggregateStore::new();
        let aggregate_id = AggregateId::new();

        store
            .save(create_test_record(aggregate_id, "Partner"))
            .await
            .unwrap();

        let loaded = store.load(aggregate_id).await.unwrap().unwrap();
        assert_eq!(loaded.aggregate_id, aggregate_id);
        assert_eq!(loaded.state["name"], "test");
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let store = InMemoryAggregateStore::new();

        let loaded = store.load(AggregateId::new()).await.unwrap();
        assert!(loaded.is_none());
        assert!(!store.exists(AggregateId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn save_replaces_previous_record() {
        let store = InMemoryAggregateStore::new();
        let aggregate_id = AggregateId::new();

        store
            .save(create_test_record(aggregate_id, "Partner"))
            .await
            .unwrap();
        store
            .save(AggregateRecord::new(
                aggregate_id,
                "Partner",
                serde_json::json!({"name": "renamed"}),
            ))
            .await
            .unwrap();

        let loaded = store.load(aggregate_id).await.unwrap().unwrap();
        assert_eq!(loaded.state["name"], "renamed");
        assert_eq!(store.record_count().await, 1);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn load_all_filters_by_type() {
        let store = InMemoryAggregateStore::new();

        store
            .save_all(vec![
                create_test_record(AggregateId::new(), "Partner"),
                create_test_record(AggregateId::new(), "Partner"),
                create_test_record(AggregateId::new(), "Customer"),
            ])
            .await
            .unwrap();

        let partners = store.load_all("Partner").await.unwrap();
        assert_eq!(partners.len(), 2);
        assert!(partners[0].aggregate_id < partners[1].aggregate_id);

        let employees = store.load_all("Employee").await.unwrap();
        assert!(employees.is_empty());
    }

    #[tokio::test]
    async fn reset_write_count_keeps_records() {
        let store = InMemoryAggregateStore::new();
        store
            .save(create_test_record(AggregateId::new(), "Partner"))
            .await
            .unwrap();

        store.reset_write_count();

        assert_eq!(store.write_count(), 0);
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let store = InMemoryAggregateStore::new();
        store
            .save(create_test_record(AggregateId::new(), "Partner"))
            .await
            .unwrap();

        store.clear().await;

        assert_eq!(store.record_count().await, 0);
        assert_eq!(store.write_count(), 0);
    }
}
