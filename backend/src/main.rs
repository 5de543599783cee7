use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mini_projects_backend::config::AppConfig;
use mini_projects_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = config.socket_addr()?;
    let app_state = initialize_backend(config)?;
    let app = create_router(app_state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
