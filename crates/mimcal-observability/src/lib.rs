//! Mimcal Observability
//!
//! Provides configurable observability features including:
//! - Tracing and distributed tracing via OpenTelemetry
//! - Metrics collection via Prometheus
//! - HTTP request/response logging
//!
//! Everything except console logging can be compiled out by disabling the
//! `observability` feature. At runtime, `OBSERVABILITY_ENABLED=false` turns
//! the same features off and leaves console logging in place.
//!
//! # Examples
//!
//! ```no_run
//! use mimcal_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     // ... application code ...
//!     shutdown_tracer().await;
//! }
//! ```

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use crate::logging::{init_tracing, is_observability_enabled, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use crate::metrics::{
    init_metrics, metrics_app, metrics_middleware, track_access_denied, track_attendance,
    track_like, track_permission_changed, track_schedule_created, track_schedule_deleted,
    track_user_registered,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    /// Request logging still happens through the console subscriber.
    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_tracing() {
        crate::basic_logging::init_basic_console_logging();
    }

    pub async fn shutdown_tracer() {}

    /// Stand-in for the Prometheus handle; never constructed.
    #[derive(Clone)]
    pub enum PrometheusHandle {}

    pub fn init_metrics() -> Option<PrometheusHandle> {
        None
    }

    pub fn metrics_app(handle: PrometheusHandle) -> Router {
        match handle {}
    }

    pub fn track_user_registered() {}
    pub fn track_schedule_created(_default_level: i32) {}
    pub fn track_schedule_deleted() {}
    pub fn track_permission_changed(_action: &str) {}
    pub fn track_access_denied(_required: &str) {}
    pub fn track_attendance(_checked: bool) {}
    pub fn track_like(_target: &str, _liked: bool, _changed: bool) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
