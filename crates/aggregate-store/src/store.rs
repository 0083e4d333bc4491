use async_trait::async_trait;

use crate::{AggregateId, AggregateRecord, Result};

/// Core trait for aggregate store implementations.
///
/// A store keeps the latest snapshot of every aggregate, keyed by its id.
/// Writes are whole-record replacements and there is no version check: when
/// two callers save the same aggregate, the last write wins.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Inserts the record, replacing any existing record with the same id.
    async fn save(&self, record: AggregateRecord) -> Result<()>;

    /// Retrieves the record for an aggregate.
    ///
    /// Returns None if the aggregate has never been saved.
    async fn load(&self, aggregate_id: AggregateId) -> Result<Option<AggregateRecord>>;

    /// Retrieves every record of the given aggregate type.
    ///
    /// Records are ordered by aggregate id so listings are stable.
    async fn load_all(&self, aggregate_type: &str) -> Result<Vec<AggregateRecord>>;
}

/// Extension trait providing convenience methods for aggregate stores.
#[async_trait]
pub trait AggregateStoreExt: AggregateStore {
    /// Checks if an aggregate has been saved.
    async fn exists(&self, aggregate_id: AggregateId) -> Result<bool> {
        Ok(self.load(aggregate_id).await?.is_some())
    }

    /// Saves several records one after another.
    ///
    /// Not atomic: a failure leaves the records written so far in place.
    async fn save_all(&self, records: Vec<AggregateRecord>) -> Result<()> {
        for record in records {
            self.save(record).await?;
        }
        Ok(())
    }
}

// Blanket implementation for all AggregateStore implementations
impl<T: AggregateStore + ?Sized> AggregateStoreExt for T {}
