use std::sync::Arc;

use common::storage::PhotoStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::processing::TryOnProcessor;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub photo_store: Arc<dyn PhotoStore>,
    pub processor: TryOnProcessor,
}
