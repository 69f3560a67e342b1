use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;

/// Connect to the configured database and bring its schema up to date with
/// the entities in [`crate::entity`].
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    db.get_schema_registry("tryon_server::entity::*")
        .sync(&db)
        .await?;

    info!(
        backend = ?db.get_database_backend(),
        max_connections = config.max_connections,
        "Database ready"
    );
    Ok(db)
}
