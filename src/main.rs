use anyhow::Context;
use dotenvy::dotenv;
use mimcal::router::init_router;
use mimcal::state::init_app_state;
use mimcal_config::ServerConfig;
use mimcal_observability::{init_metrics, init_tracing, metrics_app, shutdown_tracer};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let server_config = ServerConfig::from_env();

    let state = init_app_state()
        .await
        .context("failed to connect to the database")?;

    sqlx::migrate!("./migrations")
        .run(&state.db)
        .await
        .context("failed to run database migrations")?;

    if let Some(handle) = init_metrics() {
        let metrics_address = server_config.metrics_address();
        tokio::spawn(async move {
            match TcpListener::bind(&metrics_address).await {
                Ok(listener) => {
                    info!(address = %metrics_address, "Metrics server listening");
                    if let Err(err) = axum::serve(listener, metrics_app(handle)).await {
                        warn!(error = %err, "Metrics server stopped");
                    }
                }
                Err(err) => warn!(error = %err, address = %metrics_address, "Could not bind metrics server"),
            }
        });
    }

    let app = init_router(state);

    let address = server_config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!(address = %address, "Server running");
    info!("Swagger UI available at http://{address}/swagger-ui");
    info!("Scalar UI available at http://{address}/scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
