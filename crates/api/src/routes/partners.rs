//! Partner listing and promo-code limit endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use domain::{
    CancelPartnerLimit, LimitId, Partner, PartnerId, PartnerLimitService, PartnerRepository,
    PromoCodeLimit, SetPartnerLimit,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: PartnerRepository> {
    pub partners: PartnerLimitService<R>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct SetPartnerPromoCodeLimitRequest {
    pub limit: i32,
    pub end_date: DateTime<Utc>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct PartnerResponse {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub number_issued_promo_codes: u32,
    pub partner_limits: Vec<PartnerPromoCodeLimitResponse>,
}

#[derive(Debug, Serialize)]
pub struct PartnerPromoCodeLimitResponse {
    pub id: String,
    pub partner_id: String,
    pub limit: u32,
    pub create_date: String,
    pub end_date: String,
    pub cancel_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LimitSetResponse {
    pub limit_id: String,
    pub previous_limit_id: Option<String>,
    pub partner: PartnerResponse,
}

impl PartnerPromoCodeLimitResponse {
    fn new(partner_id: PartnerId, limit: &PromoCodeLimit) -> Self {
        Self {
            id: limit.id.to_string(),
            partner_id: partner_id.to_string(),
            limit: limit.limit,
            create_date: limit.create_date.to_rfc3339(),
            end_date: limit.end_date.to_rfc3339(),
            cancel_date: limit.cancel_date.map(|d| d.to_rfc3339()),
        }
    }
}

impl From<&Partner> for PartnerResponse {
    fn from(partner: &Partner) -> Self {
        Self {
            id: partner.id().to_string(),
            name: partner.name().to_string(),
            is_active: partner.is_active(),
            number_issued_promo_codes: partner.number_issued_promo_codes(),
            partner_limits: partner
                .limits()
                .iter()
                .map(|limit| PartnerPromoCodeLimitResponse::new(partner.id(), limit))
                .collect(),
        }
    }
}

// -- Handlers --

/// GET /api/v1/partners: list every partner with its limit history.
#[tracing::instrument(skip(state))]
pub async fn list<R: PartnerRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Json<Vec<PartnerResponse>>, ApiError> {
    let partners = state.partners.get_partners().await?;
    Ok(Json(partners.iter().map(PartnerResponse::from).collect()))
}

/// GET /api/v1/partners/:id/limits/:limit_id: one limit of a partner.
#[tracing::instrument(skip(state))]
pub async fn get_limit<R: PartnerRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path((id, limit_id)): Path<(String, String)>,
) -> Result<Json<PartnerPromoCodeLimitResponse>, ApiError> {
    let partner_id = PartnerId::from_uuid(parse_uuid(&id)?);
    let limit_id = LimitId::from_uuid(parse_uuid(&limit_id)?);

    let limit = state.partners.get_limit(partner_id, limit_id).await?;
    Ok(Json(PartnerPromoCodeLimitResponse::new(partner_id, &limit)))
}

/// POST /api/v1/partners/:id/limits: activate a new limit.
///
/// Responds 201 with the location of the created limit.
#[tracing::instrument(skip(state, req))]
pub async fn set_limit<R: PartnerRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<SetPartnerPromoCodeLimitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let partner_id = PartnerId::from_uuid(parse_uuid(&id)?);

    let result = state
        .partners
        .set_limit(SetPartnerLimit::new(partner_id, req.limit, req.end_date))
        .await?;

    let location = format!("/api/v1/partners/{partner_id}/limits/{}", result.limit_id);
    let response = LimitSetResponse {
        limit_id: result.limit_id.to_string(),
        previous_limit_id: result.previous_limit_id.map(|id| id.to_string()),
        partner: PartnerResponse::from(&result.partner),
    };

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(response),
    ))
}

/// POST /api/v1/partners/:id/canceledLimits: cancel the active limit.
#[tracing::instrument(skip(state))]
pub async fn cancel_limit<R: PartnerRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let partner_id = PartnerId::from_uuid(parse_uuid(&id)?);

    state
        .partners
        .cancel_limit(CancelPartnerLimit::new(partner_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn parse_uuid(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
