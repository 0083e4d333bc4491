//! Partner aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, LimitId, PartnerId};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{PartnerError, PromoCodeLimit};

/// Partner aggregate root.
///
/// Owns the partner's full limit history in creation order and the counter of
/// codes issued against the current limit. At most one limit is active at any
/// time; retired limits are kept with their `cancel_date` stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    id: PartnerId,

    name: String,

    is_active: bool,

    /// Codes issued against the currently active limit.
    #[serde(default)]
    number_issued_promo_codes: u32,

    #[serde(default)]
    limits: Vec<PromoCodeLimit>,
}

/// Outcome of a successful limit activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitChange {
    /// The newly activated limit.
    pub limit_id: LimitId,

    /// The limit that was active before and has now been retired.
    pub previous_limit_id: Option<LimitId>,
}

impl Aggregate for Partner {
    fn aggregate_type() -> &'static str {
        "Partner"
    }

    fn aggregate_id(&self) -> AggregateId {
        self.id.into()
    }
}

// Construction
impl Partner {
    /// Creates a partner with no limit history.
    pub fn new(id: PartnerId, name: impl Into<String>, is_active: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_active,
            number_issued_promo_codes: 0,
            limits: Vec::new(),
        }
    }

    /// Sets the issued-code counter.
    pub fn with_issued_promo_codes(mut self, issued: u32) -> Self {
        self.number_issued_promo_codes = issued;
        self
    }

    /// Appends a limit to the history as is.
    ///
    /// Meant for restoring existing data; no invariant is checked here.
    pub fn with_limit(mut self, limit: PromoCodeLimit) -> Self {
        self.limits.push(limit);
        self
    }
}

// Query methods
impl Partner {
    pub fn id(&self) -> PartnerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn number_issued_promo_codes(&self) -> u32 {
        self.number_issued_promo_codes
    }

    /// Returns the limit history, oldest first.
    pub fn limits(&self) -> &[PromoCodeLimit] {
        &self.limits
    }

    /// Returns a limit by ID.
    pub fn get_limit(&self, limit_id: LimitId) -> Option<&PromoCodeLimit> {
        self.limits.iter().find(|l| l.id == limit_id)
    }

    /// Returns the single active limit, if any.
    ///
    /// Fails with [`PartnerError::MultipleActiveLimits`] when stored state
    /// breaks the one-active-limit invariant.
    pub fn current_active_limit(&self) -> Result<Option<&PromoCodeLimit>, PartnerError> {
        Ok(self.active_limit_index()?.map(|index| &self.limits[index]))
    }

    fn active_limit_index(&self) -> Result<Option<usize>, PartnerError> {
        let mut active = self
            .limits
            .iter()
            .enumerate()
            .filter(|(_, limit)| limit.is_active())
            .map(|(index, _)| index);

        let first = active.next();
        let others = active.count();
        if others > 0 {
            return Err(PartnerError::MultipleActiveLimits {
                partner_id: self.id,
                count: others + 1,
            });
        }

        Ok(first)
    }
}

// Invariant-preserving mutations
impl Partner {
    /// Fails unless the partner is active.
    pub fn ensure_active(&self) -> Result<(), PartnerError> {
        if !self.is_active {
            return Err(PartnerError::Inactive {
                partner_id: self.id,
            });
        }
        Ok(())
    }

    /// Stamps the active limit as cancelled at `now`.
    ///
    /// Returns whether a limit was retired; without an active limit this is a no-op.
    pub fn retire_active_limit(&mut self, now: DateTime<Utc>) -> Result<bool, PartnerError> {
        match self.active_limit_index()? {
            Some(index) => {
                self.limits[index].cancel(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Appends a new active limit.
    ///
    /// The previous active limit must have been retired first.
    pub fn activate_new_limit(
        &mut self,
        limit: u32,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
        new_id: LimitId,
    ) -> Result<&PromoCodeLimit, PartnerError> {
        if let Some(active) = self.current_active_limit()? {
            return Err(PartnerError::ActiveLimitExists {
                partner_id: self.id,
                limit_id: active.id,
            });
        }

        self.limits
            .push(PromoCodeLimit::new(new_id, limit, now, end_date));
        Ok(&self.limits[self.limits.len() - 1])
    }

    /// Zeroes the issued-code counter.
    pub fn reset_issued_count(&mut self) {
        self.number_issued_promo_codes = 0;
    }
}

// Lifecycle commands
impl Partner {
    /// Replaces the active limit with a new one of `limit` codes.
    ///
    /// Validation happens before any mutation, so on error the partner is
    /// unchanged. The issued-code counter is reset on every success, whether
    /// or not a limit was active before.
    pub fn set_limit(
        &mut self,
        limit: i32,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
        new_id: LimitId,
    ) -> Result<LimitChange, PartnerError> {
        self.ensure_active()?;
        let limit = validate_limit(limit)?;
        let previous_limit_id = self.current_active_limit()?.map(|l| l.id);

        self.retire_active_limit(now)?;
        self.activate_new_limit(limit, end_date, now, new_id)?;
        self.reset_issued_count();

        Ok(LimitChange {
            limit_id: new_id,
            previous_limit_id,
        })
    }

    /// Retires the active limit without a replacement.
    ///
    /// Returns the retired limit, or `None` when nothing was active. The
    /// issued-code counter is left alone.
    pub fn cancel_limit(&mut self, now: DateTime<Utc>) -> Result<Option<LimitId>, PartnerError> {
        self.ensure_active()?;
        let active = self.current_active_limit()?.map(|l| l.id);

        self.retire_active_limit(now)?;
        Ok(active)
    }
}

fn validate_limit(limit: i32) -> Result<u32, PartnerError> {
    u32::try_from(limit)
        .ok()
        .filter(|value| *value > 0)
        .ok_or(PartnerError::InvalidLimit { limit })
}
