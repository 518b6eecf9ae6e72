use std::str::FromStr;
use std::sync::Arc;

use agape_proxy::settings::get_config;
use agape_proxy::{AppState, init_openapi_route};
use poem::listener::TcpListener;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config()?;

    let log_level = Level::from_str(&config.log_level).unwrap_or(Level::INFO);
    // Logging to File
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(log_level)
        .init();

    tracing::info!("Initializing Agape proxy...");
    tracing::info!(
        host = %config.host,
        port = config.port,
        prefix = %config.prefix(),
        fal_endpoint = %config.fal_endpoint,
        fal_key_configured = config.fal_key().is_some(),
        thumb_max_width = ?config.thumb_max_width,
        thumb_timeout_secs = config.thumb_timeout_secs,
        thumb_max_bytes = config.thumb_max_bytes,
        "run with config"
    );
    if config.fal_key().is_none() {
        tracing::warn!("FAL_KEY is not set; edit requests will fail with missing_fal_key");
    }

    let bind = format!("{}:{}", config.host, config.port);
    let app_state = Arc::new(AppState::from_config(config)?);
    let app = init_openapi_route(app_state);

    tracing::info!("run server on {}", bind);
    poem::Server::new(TcpListener::bind(bind)).run(app).await?;

    Ok(())
}
