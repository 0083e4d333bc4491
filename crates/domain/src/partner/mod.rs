//! Partner aggregate and promo-code limit lifecycle.

mod aggregate;
mod commands;
mod limit;
mod service;

pub use aggregate::{LimitChange, Partner};
pub use commands::{CancelPartnerLimit, SetPartnerLimit};
pub use limit::PromoCodeLimit;
pub use service::{LimitCancelled, LimitSet, PartnerLimitService};

use common::{LimitId, PartnerId};
use thiserror::Error;

/// Errors that can occur during partner operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartnerError {
    /// No partner is stored under the identifier.
    #[error("Partner not found: {0}")]
    NotFound(PartnerId),

    /// The partner is switched off.
    #[error("partner is not active")]
    Inactive { partner_id: PartnerId },

    /// The requested limit is zero or negative.
    #[error("limit must be positive, got {limit}")]
    InvalidLimit { limit: i32 },

    /// The partner has no limit with the identifier.
    #[error("Limit {limit_id} not found for partner {partner_id}")]
    LimitNotFound {
        partner_id: PartnerId,
        limit_id: LimitId,
    },

    /// Stored state holds more than one active limit.
    #[error("Partner {partner_id} has {count} active limits")]
    MultipleActiveLimits { partner_id: PartnerId, count: usize },

    /// A new limit was activated while another one was still active.
    #[error("Partner {partner_id} already has active limit {limit_id}")]
    ActiveLimitExists {
        partner_id: PartnerId,
        limit_id: LimitId,
    },
}

/// Coarse classification of a [`PartnerError`] for callers mapping
/// failures onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidArgument,
    /// Broken invariant in stored data; not the caller's fault.
    Internal,
}

impl ErrorKind {
    /// Returns the kind as a metrics label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Internal => "internal",
        }
    }
}

impl PartnerError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PartnerError::NotFound(_) | PartnerError::LimitNotFound { .. } => ErrorKind::NotFound,
            PartnerError::Inactive { .. } => ErrorKind::InvalidState,
            PartnerError::InvalidLimit { .. } => ErrorKind::InvalidArgument,
            PartnerError::MultipleActiveLimits { .. } | PartnerError::ActiveLimitExists { .. } => {
                ErrorKind::Internal
            }
        }
    }
}
