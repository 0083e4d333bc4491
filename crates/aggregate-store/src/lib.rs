pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::AggregateId;
pub use error::{Result, StoreError};
pub use memory::InMemoryAggregateStore;
pub use postgres::PostgresAggregateStore;
pub use record::AggregateRecord;
pub use store::{AggregateStore, AggregateStoreExt};
