use std::sync::Arc;

use anyhow::Context;
use atlas_common::storage::FilesystemImageStore;
use tracing::{Level, info};

use atlas_server::config::AppConfig;
use atlas_server::database::init_db;
use atlas_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!(url = %config.database.url, "Database ready");

    let image_store = FilesystemImageStore::new(
        config.storage.upload_dir.clone(),
        config.storage.max_upload_size,
    )
    .await
    .context("Failed to prepare upload directory")?;
    info!(
        upload_dir = %config.storage.upload_dir.display(),
        max_upload_size = config.storage.max_upload_size,
        "Upload directory ready"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        image_store: Arc::new(image_store),
    };
    let app = atlas_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
