//! Demo partners loaded at startup.

use chrono::{TimeZone, Utc};
use domain::{DomainError, LimitId, Partner, PartnerId, PartnerRepository, PromoCodeLimit};
use uuid::uuid;

/// Active partner with one active limit of 100.
pub const DEMO_PARTNER_ID: PartnerId =
    PartnerId::from_uuid(uuid!("7d994823-8226-4273-b063-1a95f3cc1df8"));

/// The active limit of [`DEMO_PARTNER_ID`].
pub const DEMO_LIMIT_ID: LimitId =
    LimitId::from_uuid(uuid!("e00633a5-978a-420e-a7d6-3e1dab116393"));

/// Switched-off partner; every limit operation on it is rejected.
pub const INACTIVE_PARTNER_ID: PartnerId =
    PartnerId::from_uuid(uuid!("894b6e9b-eb5f-406c-aefa-8ccb35d39319"));

/// Active partner with no limit history.
pub const NEW_PARTNER_ID: PartnerId =
    PartnerId::from_uuid(uuid!("0da65561-cf56-4942-bff2-22f50cf70d43"));

/// Returns the demo partners.
pub fn demo_partners() -> Vec<Partner> {
    let created = Utc.with_ymd_and_hms(2020, 7, 9, 0, 0, 0).single();
    let ends = Utc.with_ymd_and_hms(2020, 10, 9, 0, 0, 0).single();
    let toys = created
        .zip(ends)
        .map(|(created, ends)| PromoCodeLimit::new(DEMO_LIMIT_ID, 100, created, ends))
        .into_iter()
        .fold(
            Partner::new(DEMO_PARTNER_ID, "Суперигрушки", true),
            Partner::with_limit,
        );

    vec![
        toys,
        Partner::new(INACTIVE_PARTNER_ID, "Каждому кота", false).with_issued_promo_codes(3),
        Partner::new(NEW_PARTNER_ID, "Рыба твоей мечты", true),
    ]
}

/// Stores every demo partner that is not stored yet.
///
/// Returns how many partners were written.
#[tracing::instrument(skip(repository))]
pub async fn load<R: PartnerRepository>(repository: &R) -> Result<usize, DomainError> {
    let mut written = 0;
    for partner in demo_partners() {
        if repository.get_by_id(partner.id()).await?.is_some() {
            continue;
        }
        repository.update(&partner).await?;
        written += 1;
    }

    tracing::info!(written, "demo partners loaded");
    Ok(written)
}
