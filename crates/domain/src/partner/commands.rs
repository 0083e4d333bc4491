//! Partner limit commands.

use chrono::{DateTime, Utc};
use common::PartnerId;

/// Command to activate a new promo-code limit for a partner.
#[derive(Debug, Clone)]
pub struct SetPartnerLimit {
    /// The partner receiving the limit.
    pub partner_id: PartnerId,

    /// Requested cap. Signed because callers may send anything; only
    /// positive values are accepted.
    pub limit: i32,

    /// Business end date of the new limit.
    pub end_date: DateTime<Utc>,
}

impl SetPartnerLimit {
    /// Creates a new SetPartnerLimit command.
    pub fn new(partner_id: PartnerId, limit: i32, end_date: DateTime<Utc>) -> Self {
        Self {
            partner_id,
            limit,
            end_date,
        }
    }
}

/// Command to cancel a partner's active limit.
#[derive(Debug, Clone)]
pub struct CancelPartnerLimit {
    /// The partner whose limit is cancelled.
    pub partner_id: PartnerId,
}

impl CancelPartnerLimit {
    /// Creates a new CancelPartnerLimit command.
    pub fn new(partner_id: PartnerId) -> Self {
        Self { partner_id }
    }
}
