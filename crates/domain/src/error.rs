//! Domain error types.

use aggregate_store::StoreError;
use thiserror::Error;

use crate::partner::PartnerError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the aggregate store.
    #[error("Aggregate store error: {0}")]
    Store(#[from] StoreError),

    /// A partner rule rejected the operation.
    #[error("Partner error: {0}")]
    Partner(PartnerError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns the partner rule violation, if that is what this error is.
    pub fn as_partner_error(&self) -> Option<&PartnerError> {
        match self {
            DomainError::Partner(err) => Some(err),
            _ => None,
        }
    }
}
