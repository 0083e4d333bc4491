//! Promo-code limit value type.

use chrono::{DateTime, Utc};
use common::LimitId;
use serde::{Deserialize, Serialize};

/// A cap on the number of promo codes a partner may issue.
///
/// A limit is active while `cancel_date` is `None`. Once stamped, it stays in
/// the partner's history forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCodeLimit {
    pub id: LimitId,

    /// Maximum number of codes issuable under this limit.
    pub limit: u32,

    /// When the limit was activated.
    pub create_date: DateTime<Utc>,

    /// Business end of validity. Never enforced automatically.
    pub end_date: DateTime<Utc>,

    /// When the limit was superseded or cancelled.
    #[serde(default)]
    pub cancel_date: Option<DateTime<Utc>>,
}

impl PromoCodeLimit {
    /// Creates a new active limit.
    pub fn new(
        id: LimitId,
        limit: u32,
        create_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            limit,
            create_date,
            end_date,
            cancel_date: None,
        }
    }

    /// Returns the same limit already cancelled at `cancel_date`.
    pub fn cancelled_at(mut self, cancel_date: DateTime<Utc>) -> Self {
        self.cancel_date = Some(cancel_date);
        self
    }

    /// Returns true if the limit has not been cancelled.
    pub fn is_active(&self) -> bool {
        self.cancel_date.is_none()
    }

    pub(crate) fn cancel(&mut self, now: DateTime<Utc>) {
        self.cancel_date = Some(now);
    }
}
