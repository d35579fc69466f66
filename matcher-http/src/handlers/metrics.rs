//! Prometheus `/metrics` endpoint.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

use super::AppState;

/// GET /metrics: Prometheus text exposition format, built fresh from live
/// state on every request.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = Registry::new();

    let gauges = [
        (
            "resume_matcher_skipped_response_items",
            "Search response items dropped because their shape was not recognized",
            state.matcher.client().skipped_items() as f64,
        ),
        (
            "resume_matcher_uptime_seconds",
            "Seconds since the server started",
            state.start_time.elapsed().as_secs_f64(),
        ),
        (
            "resume_matcher_index_ready",
            "Whether index provisioning succeeded at startup (1=yes, 0=no)",
            if state.index_ready { 1.0 } else { 0.0 },
        ),
        (
            "resume_matcher_index_dimension",
            "Vector dimension of the configured index",
            state.matcher.client().index_config().dimension as f64,
        ),
    ];
    for (name, help, value) in gauges {
        if let Err(e) = register_gauge(&registry, name, help, value) {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("metrics registration error: {}", e),
            )
                .into_response();
        }
    }

    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {}", e),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        buffer,
    )
        .into_response()
}

fn register_gauge(
    registry: &Registry,
    name: &str,
    help: &str,
    value: f64,
) -> prometheus::Result<()> {
    let gauge = prometheus::Gauge::new(name, help)?;
    registry.register(Box::new(gauge.clone()))?;
    gauge.set(value);
    Ok(())
}
