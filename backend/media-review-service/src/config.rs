/// Configuration management for media-review-service
///
/// Loads configuration from environment variables with sensible defaults.
/// Outside production a `.env` file in the working directory is read first.
use crate::error::{AppError, Result};
use serde::Deserialize;
use std::time::Duration;

pub const ENV_PROD: &str = "prod";

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub websocket: WebSocketConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
    /// Public URL of this service; informational only
    pub server_url: Option<String>,
    pub max_body_bytes: usize,
    /// Requests still running after this long are answered with 504
    pub request_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database: Option<DatabaseConfig>,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct WebSocketConfig {
    /// Close connections that stay silent this long. `None` disables the check.
    pub idle_timeout: Option<Duration>,
    /// A frame write that takes longer evicts the connection
    pub write_timeout: Duration,
}

/// Raw environment as read by `envy`
#[derive(Debug, Deserialize)]
struct EnvVars {
    #[serde(default = "default_env")]
    app_env: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    server_url: Option<String>,
    #[serde(default)]
    storage_backend: StorageBackend,
    database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    database_max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    database_acquire_timeout_secs: u64,
    #[serde(default = "default_allowed_origins")]
    cors_allowed_origins: Vec<String>,
    #[serde(default = "default_max_body_bytes")]
    max_body_bytes: usize,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    ws_idle_timeout_secs: Option<u64>,
    #[serde(default = "default_ws_write_timeout_secs")]
    ws_write_timeout_secs: u64,
}

fn default_env() -> String {
    "dev".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_ws_write_timeout_secs() -> u64 {
    5
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        if std::env::var("APP_ENV").as_deref() != Ok(ENV_PROD) {
            match dotenvy::dotenv() {
                Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
                Err(e) => tracing::warn!("No .env file loaded: {}", e),
            }
        } else {
            tracing::info!("Skip loading .env file");
        }

        let vars = envy::from_env::<EnvVars>()?;
        Self::from_vars(vars)
    }

    /// Build configuration from explicit key/value pairs (upper-case keys)
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars = envy::from_iter::<_, EnvVars>(pairs)?;
        Self::from_vars(vars)
    }

    fn from_vars(vars: EnvVars) -> Result<Self> {
        let database = match vars.database_url.filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: vars.database_max_connections.max(1),
                acquire_timeout: Duration::from_secs(vars.database_acquire_timeout_secs),
            }),
            None => None,
        };

        if vars.storage_backend == StorageBackend::Postgres && database.is_none() {
            return Err(AppError::Config(
                "DATABASE_URL is required when STORAGE_BACKEND=postgres".to_string(),
            ));
        }

        let allowed_origins: Vec<String> = vars
            .cors_allowed_origins
            .into_iter()
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            app: AppConfig {
                host: vars.host,
                port: vars.port,
                env: vars.app_env,
                server_url: vars.server_url,
                max_body_bytes: vars.max_body_bytes,
                request_timeout: Duration::from_secs(vars.request_timeout_secs.max(1)),
            },
            cors: CorsConfig {
                allowed_origins: if allowed_origins.is_empty() {
                    default_allowed_origins()
                } else {
                    allowed_origins
                },
            },
            storage: StorageConfig {
                backend: vars.storage_backend,
                database,
            },
            websocket: WebSocketConfig {
                idle_timeout: vars
                    .ws_idle_timeout_secs
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs),
                write_timeout: Duration::from_secs(vars.ws_write_timeout_secs.max(1)),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }

    pub fn is_production(&self) -> bool {
        self.app.env == ENV_PROD
    }
}
