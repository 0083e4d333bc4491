//! Persistence contract for partners and its store-backed implementation.

use std::marker::PhantomData;

use aggregate_store::{AggregateRecord, AggregateStore};
use async_trait::async_trait;
use common::{AggregateId, PartnerId};

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::partner::Partner;

/// Loads and saves whole partner aggregates by identifier.
///
/// There is no version check on `update`: concurrent writers to the same
/// partner race and the last write wins.
#[async_trait]
pub trait PartnerRepository: Send + Sync {
    /// Loads a partner with its full limit history.
    ///
    /// Returns None if no partner is stored under `id`.
    async fn get_by_id(&self, id: PartnerId) -> Result<Option<Partner>, DomainError>;

    /// Loads every stored partner.
    async fn get_all(&self) -> Result<Vec<Partner>, DomainError>;

    /// Persists a full snapshot of the partner, creating or replacing it.
    async fn update(&self, partner: &Partner) -> Result<(), DomainError>;
}

/// Repository that keeps aggregates as JSON records in an [`AggregateStore`].
pub struct AggregateRepository<S, A>
where
    S: AggregateStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> AggregateRepository<S, A>
where
    S: AggregateStore,
    A: Aggregate,
{
    /// Creates a new repository over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        match self.store.load(aggregate_id).await? {
            Some(record) => Ok(Some(record.into_state()?)),
            None => Ok(None),
        }
    }

    /// Loads every aggregate of this type.
    pub async fn load_all(&self) -> Result<Vec<A>, DomainError> {
        let records = self.store.load_all(A::aggregate_type()).await?;
        records
            .into_iter()
            .map(|record| record.into_state().map_err(DomainError::from))
            .collect()
    }

    /// Writes the aggregate's current state.
    pub async fn save(&self, aggregate: &A) -> Result<(), DomainError> {
        let record =
            AggregateRecord::from_state(aggregate.aggregate_id(), A::aggregate_type(), aggregate)?;
        self.store.save(record).await?;
        Ok(())
    }
}

#[async_trait]
impl<S> PartnerRepository for AggregateRepository<S, Partner>
where
    S: AggregateStore,
{
    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: PartnerId) -> Result<Option<Partner>, DomainError> {
        self.load(id.into()).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Partner>, DomainError> {
        self.load_all().await
    }

    #[tracing::instrument(skip(self, partner), fields(partner_id = %partner.id()))]
    async fn update(&self, partner: &Partner) -> Result<(), DomainError> {
        self.save(partner).await
    }
}
