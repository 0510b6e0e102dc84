//! HTTP surface: health, lookup and history routes.

use crate::{
    errors::LookupError, metrics, service::LookupService, store::LookupRecord, LookupSummary,
    LookupType,
};
use axum::{
    extract::{Path, Query, State},
    http::HeaderValue,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub lookup_service: Arc<LookupService>,
}

#[derive(Debug, Deserialize)]
pub struct WhoisQuery {
    /// `domain` (default) or `contact`
    #[serde(default, rename = "type")]
    pub lookup_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    items: Vec<LookupRecord>,
}

/// Routes without middleware, handy for tests.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/whois/:domain", get(whois_lookup))
        .route("/api/history", get(lookup_history))
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(state)
}

/// Full application router with tracing, compression and CORS.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    routes(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors_layer(cors_origins))
            .into_inner(),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Credentials rule out wildcards, so mirror the request instead
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "OK" })
}

async fn whois_lookup(
    Path(domain): Path<String>,
    Query(params): Query<WhoisQuery>,
    State(state): State<AppState>,
) -> Result<Json<LookupSummary>, LookupError> {
    let start_time = Instant::now();
    let lookup_type = params
        .lookup_type
        .as_deref()
        .map(LookupType::from_param)
        .unwrap_or_default();

    metrics::increment_lookups(lookup_type);

    match state.lookup_service.lookup(&domain, lookup_type).await {
        Ok(summary) => {
            metrics::record_query_time(start_time.elapsed().as_millis() as u64);
            Ok(Json(summary))
        }
        Err(e) => {
            metrics::increment_errors(e.kind());
            Err(e)
        }
    }
}

async fn lookup_history(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Json<HistoryResponse> {
    let items = state.lookup_service.history(params.limit).await;
    Json(HistoryResponse { items })
}
