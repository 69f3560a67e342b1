use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// `"*"` allows any origin.
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must not be empty".into()));
        }
        if self.token_ttl_hours <= 0 {
            return Err(ConfigError::Message(format!(
                "auth.token_ttl_hours must be positive, got {}",
                self.token_ttl_hours
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    /// Largest accepted photo, in bytes.
    pub max_photo_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TryOnConfig {
    /// Simulated processing time before a try-on is marked completed.
    pub processing_delay_secs: u64,
    /// Attempts at persisting the completion before reporting a failure.
    pub max_attempts: u8,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,
}

impl Default for TryOnConfig {
    fn default() -> Self {
        Self {
            processing_delay_secs: 5,
            max_attempts: 3,
            retry_base_ms: 500,
            retry_max_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    /// TOML product catalog loaded on startup.
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub tryon: TryOnConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.cors.allow_origins", vec!["*"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 20)?
            .set_default("auth.token_ttl_hours", 72)?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.max_photo_size", 10 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., TRYON__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("TRYON").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.auth.validate()?;
        Ok(config)
    }
}
