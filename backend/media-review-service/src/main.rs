/// Media Review Service - HTTP + WebSocket server
///
/// Serves media CRUD for the review dashboard and notifies connected
/// dashboards over WebSocket whenever the media set changes.
use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use media_review_service::config::{CorsConfig, StorageBackend};
use media_review_service::middleware::{RequestId, RequestTimeout, ACCESS_LOG_FORMAT};
use media_review_service::store::{InMemoryMediaStore, MediaStore, PgMediaStore};
use media_review_service::{logging, routes, AppState, Config};
use std::sync::Arc;

fn build_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default();
    for origin in &config.allowed_origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-csrf-token"),
        ])
        .max_age(300)
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn MediaStore>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let database = config
                .storage
                .database
                .as_ref()
                .context("DATABASE_URL is required for the postgres backend")?;

            let store = PgMediaStore::connect(database)
                .await
                .context("Failed to connect to database")?;
            store.migrate().await.context("Failed to run migrations")?;

            tracing::info!(
                max_connections = database.max_connections,
                "Connected to PostgreSQL media store"
            );
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory media store; records are lost on restart");
            Ok(Arc::new(InMemoryMediaStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing(logging::LogFormat::from_app_env());

    let config = Config::from_env().context("Failed to load configuration")?;
    let bind_address = config.bind_address();

    tracing::info!(
        env = %config.app.env,
        backend = ?config.storage.backend,
        "Starting media-review-service on {}",
        bind_address
    );
    if let Some(server_url) = &config.app.server_url {
        tracing::info!("Public URL: {}", server_url);
    }

    let store = build_store(&config).await?;
    let state = AppState::new(store, config);
    let cors_config = state.config.cors.clone();
    let body_limit = state.config.app.max_body_bytes;
    let request_timeout = state.config.app.request_timeout;

    HttpServer::new(move || {
        App::new()
            .wrap(RequestTimeout::new(request_timeout))
            .wrap(RequestId::new())
            .wrap(Logger::new(ACCESS_LOG_FORMAT))
            .wrap(build_cors(&cors_config))
            .app_data(web::Data::new(state.clone()))
            .app_data(routes::json_config(body_limit))
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("media-review-service shutting down");
    Ok(())
}
