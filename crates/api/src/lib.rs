//! HTTP API server for the contribution reconciliation system.
//!
//! Exposes payment initiation, the provider callback webhook, status
//! polling, the campaign statistics projection, and observability
//! endpoints, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use domain::CampaignSettings;
use engine::Reconciler;
use gateway::InMemoryGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use stats::StatsService;
use store::ContributionStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: ContributionStore> {
    pub reconciler: Reconciler<S, InMemoryGateway>,
    pub stats: StatsService<S>,
}

/// Creates the application state around a store and gateway.
pub fn create_state<S>(
    store: S,
    gateway: InMemoryGateway,
    settings: CampaignSettings,
    gateway_timeout: Duration,
) -> Arc<AppState<S>>
where
    S: ContributionStore + Clone + 'static,
{
    Arc::new(AppState {
        reconciler: Reconciler::new(store.clone(), gateway, settings.clone(), gateway_timeout),
        stats: StatsService::new(store, settings),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ContributionStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/contributions", post(routes::contributions::initiate::<S>))
        .route("/contributions/recent", get(routes::contributions::recent::<S>))
        .route("/payments/callback", post(routes::payments::callback::<S>))
        .route("/payments/status", post(routes::payments::poll::<S>))
        .route(
            "/payments/{correlation_id}",
            get(routes::payments::local_status::<S>),
        )
        .route("/stats", get(routes::stats::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
