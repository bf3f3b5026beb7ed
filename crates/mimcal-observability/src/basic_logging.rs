use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console-only logging.
///
/// Used when the `observability` feature is compiled out or when
/// `OBSERVABILITY_ENABLED=false`. `LOG_LEVEL` (default `info`) sets the
/// level for Mimcal crates; noisy dependencies are held at `warn`.
/// `RUST_LOG` overrides both.
pub fn init_basic_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mimcal={log_level},mimcal_cli={log_level},tower_http=warn,hyper=warn,tonic=warn,h2=warn,sqlx=warn"
        ))
    });

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    // A second init (tests, CLI after server) is not an error worth surfacing.
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
