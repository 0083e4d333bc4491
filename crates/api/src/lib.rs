//! HTTP API for partner promo-code limits.
//!
//! Exposes the limit lifecycle over REST, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use aggregate_store::AggregateStore;
use axum::Router;
use axum::routing::{get, post};
use domain::{AggregateRepository, Partner, PartnerLimitService, PartnerRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::partners::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: PartnerRepository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let partners_router = Router::new()
        .route("/", get(routes::partners::list::<R>))
        .route("/{id}/limits", post(routes::partners::set_limit::<R>))
        .route(
            "/{id}/limits/{limit_id}",
            get(routes::partners::get_limit::<R>),
        )
        .route(
            "/{id}/canceledLimits",
            post(routes::partners::cancel_limit::<R>),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api/v1/partners", partners_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state backed by the given aggregate store.
pub fn create_default_state<S: AggregateStore + 'static>(
    store: S,
) -> Arc<AppState<AggregateRepository<S, Partner>>> {
    let repository = AggregateRepository::new(store);
    Arc::new(AppState {
        partners: PartnerLimitService::new(repository),
    })
}

/// Registers descriptions for the counters the service emits.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "partner_limits_set_total",
        "Promo-code limits activated for partners"
    );
    metrics::describe_counter!(
        "partner_limits_cancelled_total",
        "Cancel-limit calls that succeeded, including no-ops"
    );
    metrics::describe_counter!(
        "partner_limit_rejections_total",
        "Limit operations rejected, by operation and reason"
    );
    metrics::describe_counter!(
        "aggregate_store_writes_total",
        "Aggregate snapshots written to the store"
    );
}
