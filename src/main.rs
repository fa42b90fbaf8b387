use anyhow::Context;
use dotenv::dotenv;
use tracing::info;

use locale_hub::telemetry::{init_telemetry, TelemetryConfig};
use locale_hub::{app::create_router, app_state::AppState, config, i18n::init_i18n};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = config::init()?;

    let telemetry = init_telemetry(Some(TelemetryConfig {
        service_name: config.app.name.clone(),
        environment: format!("{:?}", config.app.environment).to_lowercase(),
        ..TelemetryConfig::default()
    }))
    .await?;

    let translations = init_i18n(&config.i18n)?;
    let state = AppState::new(config.i18n.clone(), translations);
    let app = create_router(state);

    let addr = config.server_addr();
    info!(
        "{} listening on {} (routes under '{}')",
        config.app.name, addr, config.i18n.base_path
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to serve application")?;

    telemetry.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
