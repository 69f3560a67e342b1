use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemPhotoStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tryon_server::config::AppConfig;
use tryon_server::database::init_db;
use tryon_server::processing::{TryOnProcessor, consume_failures};
use tryon_server::seed::{Catalog, ensure_indexes, seed_catalog};
use tryon_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to connect to database")?;

    ensure_indexes(&db).await?;

    if let Some(path) = &config.seed.catalog_path {
        let catalog = Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?;
        seed_catalog(&db, &catalog)
            .await
            .context("Failed to seed catalog")?;
    }

    let photo_store = FilesystemPhotoStore::new(
        config.storage.upload_dir.clone(),
        config.storage.max_photo_size,
    )
    .await
    .context("Failed to initialize photo storage")?;

    let (processor, failures) = TryOnProcessor::new(db.clone(), config.tryon.clone());
    tokio::spawn(consume_failures(failures));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        photo_store: Arc::new(photo_store),
        processor: processor.clone(),
    };

    let app = tryon_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(processor))
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then stop pending try-on jobs.
async fn shutdown_signal(processor: TryOnProcessor) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, cancelling try-on jobs");
    processor.shutdown();
}
