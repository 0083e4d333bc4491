//! Integration tests for the API server.

use std::sync::Arc;
use std::sync::OnceLock;

use aggregate_store::InMemoryAggregateStore;
use api::routes::partners::AppState;
use api::seed::{DEMO_LIMIT_ID, DEMO_PARTNER_ID, INACTIVE_PARTNER_ID, NEW_PARTNER_ID};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use domain::{AggregateRepository, Partner, PartnerId};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

type TestState = Arc<AppState<AggregateRepository<InMemoryAggregateStore, Partner>>>;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn setup_with_state() -> (axum::Router, TestState, InMemoryAggregateStore) {
    let store = InMemoryAggregateStore::new();
    let state = api::create_default_state(store.clone());
    api::seed::load(state.partners.repository()).await.unwrap();
    store.reset_write_count();
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state, store)
}

async fn setup() -> axum::Router {
    setup_with_state().await.0
}

fn set_limit_request(partner_id: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/partners/{partner_id}/limits"))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn cancel_limit_request(partner_id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/partners/{partner_id}/canceledLimits"))
        .body(Body::empty())
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn stored_partner(state: &TestState, id: PartnerId) -> Partner {
    state.partners.get_partner(id).await.unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_list_partners() {
    let app = setup().await;

    let response = app.oneshot(get_request("/api/v1/partners")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let partners = json.as_array().unwrap();
    assert_eq!(partners.len(), 3);

    let toys = partners
        .iter()
        .find(|p| p["id"] == DEMO_PARTNER_ID.to_string())
        .unwrap();
    assert_eq!(toys["is_active"], true);
    assert_eq!(toys["partner_limits"][0]["id"], DEMO_LIMIT_ID.to_string());
    assert_eq!(toys["partner_limits"][0]["limit"], 100);
}

#[tokio::test]
async fn test_set_limit_returns_created_with_location() {
    let (app, state, store) = setup_with_state().await;

    let response = app
        .clone()
        .oneshot(set_limit_request(
            &DEMO_PARTNER_ID.to_string(),
            serde_json::json!({ "limit": 3, "end_date": "2030-01-01T00:00:00Z" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let json = body_json(response).await;
    let limit_id = json["limit_id"].as_str().unwrap();
    assert_eq!(
        location,
        format!("/api/v1/partners/{DEMO_PARTNER_ID}/limits/{limit_id}")
    );
    assert_eq!(json["previous_limit_id"], DEMO_LIMIT_ID.to_string());
    assert_eq!(json["partner"]["number_issued_promo_codes"], 0);
    assert_eq!(store.write_count(), 1);

    let limit_response = app.oneshot(get_request(&location)).await.unwrap();
    assert_eq!(limit_response.status(), StatusCode::OK);
    let limit = body_json(limit_response).await;
    assert_eq!(limit["limit"], 3);
    assert!(limit["cancel_date"].is_null());

    let partner = stored_partner(&state, DEMO_PARTNER_ID).await;
    assert_eq!(partner.limits().len(), 2);
    assert!(partner.get_limit(DEMO_LIMIT_ID).unwrap().cancel_date.is_some());
}

#[tokio::test]
async fn test_set_limit_on_partner_without_limits() {
    let (app, state, _) = setup_with_state().await;

    let response = app
        .oneshot(set_limit_request(
            &NEW_PARTNER_ID.to_string(),
            serde_json::json!({ "limit": 1000, "end_date": "2030-06-01T12:00:00Z" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["previous_limit_id"].is_null());

    let partner = stored_partner(&state, NEW_PARTNER_ID).await;
    assert_eq!(partner.limits().len(), 1);
    assert_eq!(partner.limits()[0].limit, 1000);
}

#[tokio::test]
async fn test_set_limit_inactive_partner_is_bad_request() {
    let (app, state, store) = setup_with_state().await;

    let response = app
        .oneshot(set_limit_request(
            &INACTIVE_PARTNER_ID.to_string(),
            serde_json::json!({ "limit": 10, "end_date": "2030-01-01T00:00:00Z" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("not active"));
    assert_eq!(store.write_count(), 0);
    assert_eq!(
        stored_partner(&state, INACTIVE_PARTNER_ID)
            .await
            .number_issued_promo_codes(),
        3
    );
}

#[tokio::test]
async fn test_set_limit_non_positive_is_bad_request() {
    let (app, state, store) = setup_with_state().await;

    let response = app
        .oneshot(set_limit_request(
            &DEMO_PARTNER_ID.to_string(),
            serde_json::json!({ "limit": -1, "end_date": "2030-01-01T00:00:00Z" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.write_count(), 0);
    let partner = stored_partner(&state, DEMO_PARTNER_ID).await;
    assert_eq!(partner.limits().len(), 1);
    assert!(partner.limits()[0].is_active());
}

#[tokio::test]
async fn test_set_limit_unknown_partner_is_not_found() {
    let app = setup().await;

    let response = app
        .oneshot(set_limit_request(
            &PartnerId::new().to_string(),
            serde_json::json!({ "limit": 10, "end_date": "2030-01-01T00:00:00Z" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_limit_malformed_id_is_bad_request() {
    let app = setup().await;

    let response = app
        .oneshot(set_limit_request(
            "not-a-uuid",
            serde_json::json!({ "limit": 10, "end_date": "2030-01-01T00:00:00Z" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Invalid ID format"));
}

#[tokio::test]
async fn test_cancel_limit_returns_no_content() {
    let (app, state, store) = setup_with_state().await;

    let response = app
        .oneshot(cancel_limit_request(&DEMO_PARTNER_ID.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.write_count(), 1);
    let partner = stored_partner(&state, DEMO_PARTNER_ID).await;
    assert!(partner.limits()[0].cancel_date.is_some());
}

#[tokio::test]
async fn test_cancel_limit_twice_is_idempotent() {
    let (app, state, _) = setup_with_state().await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(cancel_limit_request(&DEMO_PARTNER_ID.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let partner = stored_partner(&state, DEMO_PARTNER_ID).await;
    assert_eq!(partner.limits().len(), 1);
    assert!(partner.current_active_limit().unwrap().is_none());
}

#[tokio::test]
async fn test_cancel_limit_inactive_partner_is_bad_request() {
    let (app, _, store) = setup_with_state().await;

    let response = app
        .oneshot(cancel_limit_request(&INACTIVE_PARTNER_ID.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_cancel_limit_unknown_partner_is_not_found() {
    let app = setup().await;

    let response = app
        .oneshot(cancel_limit_request(&PartnerId::new().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_unknown_limit_is_not_found() {
    let app = setup().await;

    let response = app
        .oneshot(get_request(&format!(
            "/api/v1/partners/{DEMO_PARTNER_ID}/limits/{}",
            PartnerId::new()
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint_reports_limit_counters() {
    let app = setup().await;

    let response = app
        .clone()
        .oneshot(set_limit_request(
            &DEMO_PARTNER_ID.to_string(),
            serde_json::json!({ "limit": 5, "end_date": "2030-01-01T00:00:00Z" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("partner_limits_set_total"));
}
