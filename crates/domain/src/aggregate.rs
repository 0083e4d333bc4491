//! Core aggregate trait.

use common::AggregateId;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for aggregates persisted as whole snapshots.
///
/// An aggregate is a cluster of domain objects that can be treated as a single unit.
/// The aggregate root ensures consistency of changes being made within the aggregate:
/// it is loaded in full, mutated in memory and written back in full.
pub trait Aggregate: Serialize + DeserializeOwned + Send + Sync + Sized {
    /// Returns the aggregate type name.
    ///
    /// Used to tag stored records so that listings can be filtered by kind.
    fn aggregate_type() -> &'static str;

    /// Returns the key under which the aggregate is stored.
    fn aggregate_id(&self) -> AggregateId;
}
