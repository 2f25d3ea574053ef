use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::AppError;
use crate::handlers;

/// JSON extractor settings: body limit and decode errors as `BadRequest`
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err: JsonPayloadError, req: &HttpRequest| {
            tracing::debug!(path = %req.path(), error = %err, "Rejected request body");
            AppError::BadRequest(err.to_string()).into()
        })
}

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/api/health-check/v1/status",
        web::get().to(handlers::server_status),
    )
    .service(
        web::scope("/api/media/v1")
            .route("", web::get().to(handlers::list_media))
            .route("", web::post().to(handlers::create_media))
            .route("/{id}", web::get().to(handlers::get_media))
            .route("/{id}", web::put().to(handlers::update_media))
            .route("/{id}", web::delete().to(handlers::delete_media)),
    )
    .route("/ws", web::get().to(handlers::ws_handler));
}
