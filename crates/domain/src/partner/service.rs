//! Partner limit service: the two limit lifecycle operations plus lookups.

use chrono::Utc;
use common::{LimitId, PartnerId};

use crate::error::DomainError;
use crate::repository::PartnerRepository;

use super::{CancelPartnerLimit, Partner, PartnerError, PromoCodeLimit, SetPartnerLimit};

impl From<PartnerError> for DomainError {
    fn from(e: PartnerError) -> Self {
        DomainError::Partner(e)
    }
}

/// Result of a successful set-limit call.
#[derive(Debug, Clone)]
pub struct LimitSet {
    /// The limit that was created.
    pub limit_id: LimitId,

    /// The limit it replaced, if one was active.
    pub previous_limit_id: Option<LimitId>,

    /// The partner as persisted.
    pub partner: Partner,
}

/// Result of a successful cancel-limit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitCancelled {
    /// The retired limit, or None if the partner had no active limit.
    pub cancelled_limit_id: Option<LimitId>,
}

/// Service for managing partner promo-code limits.
///
/// Every mutating call is one load, one in-memory change and one write.
/// Rejected calls never reach the write.
pub struct PartnerLimitService<R: PartnerRepository> {
    repository: R,
}

impl<R: PartnerRepository> PartnerLimitService<R> {
    /// Creates a new service over the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Activates a new limit, retiring the current one.
    #[tracing::instrument(skip(self), fields(partner_id = %cmd.partner_id))]
    pub async fn set_limit(&self, cmd: SetPartnerLimit) -> Result<LimitSet, DomainError> {
        let mut partner = self.load(cmd.partner_id, "set_limit").await?;

        let change = partner
            .set_limit(cmd.limit, cmd.end_date, Utc::now(), LimitId::new())
            .inspect_err(|e| record_rejection("set_limit", e))?;

        self.repository.update(&partner).await?;

        metrics::counter!("partner_limits_set_total").increment(1);
        tracing::info!(
            limit_id = %change.limit_id,
            previous_limit_id = ?change.previous_limit_id,
            limit = cmd.limit,
            "partner limit set"
        );

        Ok(LimitSet {
            limit_id: change.limit_id,
            previous_limit_id: change.previous_limit_id,
            partner,
        })
    }

    /// Cancels the active limit, if any.
    ///
    /// Succeeds when nothing is active; the partner is written back unchanged.
    #[tracing::instrument(skip(self), fields(partner_id = %cmd.partner_id))]
    pub async fn cancel_limit(
        &self,
        cmd: CancelPartnerLimit,
    ) -> Result<LimitCancelled, DomainError> {
        let mut partner = self.load(cmd.partner_id, "cancel_limit").await?;

        let cancelled_limit_id = partner
            .cancel_limit(Utc::now())
            .inspect_err(|e| record_rejection("cancel_limit", e))?;

        self.repository.update(&partner).await?;

        metrics::counter!("partner_limits_cancelled_total").increment(1);
        match cancelled_limit_id {
            Some(limit_id) => tracing::info!(%limit_id, "partner limit cancelled"),
            None => tracing::info!("no active limit to cancel"),
        }

        Ok(LimitCancelled { cancelled_limit_id })
    }

    /// Loads every partner.
    #[tracing::instrument(skip(self))]
    pub async fn get_partners(&self) -> Result<Vec<Partner>, DomainError> {
        self.repository.get_all().await
    }

    /// Loads a partner by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_partner(&self, partner_id: PartnerId) -> Result<Partner, DomainError> {
        self.load(partner_id, "get_partner").await
    }

    /// Loads a single limit of a partner.
    #[tracing::instrument(skip(self))]
    pub async fn get_limit(
        &self,
        partner_id: PartnerId,
        limit_id: LimitId,
    ) -> Result<PromoCodeLimit, DomainError> {
        let partner = self.load(partner_id, "get_limit").await?;

        partner.get_limit(limit_id).cloned().ok_or_else(|| {
            DomainError::Partner(PartnerError::LimitNotFound {
                partner_id,
                limit_id,
            })
        })
    }

    async fn load(
        &self,
        partner_id: PartnerId,
        operation: &'static str,
    ) -> Result<Partner, DomainError> {
        match self.repository.get_by_id(partner_id).await? {
            Some(partner) => Ok(partner),
            None => {
                let err = PartnerError::NotFound(partner_id);
                record_rejection(operation, &err);
                Err(err.into())
            }
        }
    }
}

fn record_rejection(operation: &'static str, err: &PartnerError) {
    metrics::counter!(
        "partner_limit_rejections_total",
        "operation" => operation,
        "reason" => err.kind().as_str()
    )
    .increment(1);
    tracing::warn!(operation, error = %err, "partner operation rejected");
}
