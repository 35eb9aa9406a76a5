// Social Media API Server

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use social_media_api::{api::build_app, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("social_media_api=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    if let Some(dir) = config.database.parent_dir() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::create_dir_all(&config.media.root).await?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;
    let app = build_app(app_state);

    let addr = config.server_address();
    tracing::info!("Social media API listening on http://{}", addr);
    tracing::info!("  API:    {}", social_media_api::api::API_PREFIX);
    tracing::info!("  Media:  {} -> {}", config.media.url, config.media.root);
    tracing::info!("  Health: /health");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
