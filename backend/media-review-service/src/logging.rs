use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ENV_PROD;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// JSON lines in production, human-readable elsewhere
    pub fn for_env(app_env: &str) -> Self {
        if app_env == ENV_PROD {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }

    /// Read `APP_ENV` directly; logging starts before configuration loads
    pub fn from_app_env() -> Self {
        Self::for_env(std::env::var("APP_ENV").as_deref().unwrap_or_default())
    }
}

pub fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,actix_server=warn"));

    let builder = fmt().with_env_filter(env_filter).with_target(false);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
