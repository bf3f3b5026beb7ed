use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::warn;

use crate::logging::is_observability_enabled;

const REQUEST_DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Installs the Prometheus recorder and its upkeep task.
/// Returns `None` if observability is disabled or the recorder can't be installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = match PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            REQUEST_DURATION_BUCKETS,
        )
        .and_then(|builder| builder.install_recorder())
    {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "Failed to install Prometheus recorder, metrics disabled");
            return None;
        }
    };

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    let status_category = match status {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    counter!("http_requests_by_status", "status_category" => status_category).increment(1);

    gauge!("http_requests_active").decrement(1.0);

    response
}

/// Router for the metrics server.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Business metrics

pub fn track_user_registered() {
    if !is_observability_enabled() {
        return;
    }
    counter!("users_registered_total").increment(1);
}

pub fn track_schedule_created(default_level: i32) {
    if !is_observability_enabled() {
        return;
    }
    counter!("schedules_created_total", "default_level" => default_level.to_string()).increment(1);
}

pub fn track_schedule_deleted() {
    if !is_observability_enabled() {
        return;
    }
    counter!("schedules_deleted_total").increment(1);
}

/// `action` is `granted` or `revoked`.
pub fn track_permission_changed(action: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("schedule_permission_changes_total", "action" => action.to_string()).increment(1);
}

pub fn track_access_denied(required: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("schedule_access_denied_total", "required" => required.to_string()).increment(1);
}

pub fn track_attendance(checked: bool) {
    if !is_observability_enabled() {
        return;
    }
    let action = if checked { "check" } else { "uncheck" };
    counter!("event_attendance_changes_total", "action" => action).increment(1);
}

/// `changed` is false when the call was a no-op (double like, unlike without like).
pub fn track_like(target: &str, liked: bool, changed: bool) {
    if !is_observability_enabled() {
        return;
    }
    let action = if liked { "like" } else { "unlike" };
    counter!(
        "likes_total",
        "target" => target.to_string(),
        "action" => action,
        "changed" => changed.to_string()
    )
    .increment(1);
}
