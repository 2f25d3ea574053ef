/// Media handlers - HTTP endpoints for media records
use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{CreateMediaRequest, DeleteResponse, MediaPayload, UpdateMediaRequest};
use crate::state::AppState;
use crate::websocket::ChangeEvent;

fn require_id(raw: &str) -> Result<&str> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(AppError::MissingId);
    }
    Ok(id)
}

/// Tell every connected client to re-query. Never fails the request.
async fn notify_media_updated(state: &AppState) {
    let report = state.hub.broadcast(&ChangeEvent::MediaUpdated).await;
    if report.evicted > 0 {
        tracing::info!(
            delivered = report.delivered,
            evicted = report.evicted,
            "Dropped unreachable clients while broadcasting"
        );
    }
}

/// List all media
pub async fn list_media(state: web::Data<AppState>) -> Result<HttpResponse> {
    let media = state.store.get_all().await?;
    Ok(HttpResponse::Ok().json(media))
}

/// Get a specific media record
pub async fn get_media(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = require_id(&path)?;
    let media = state.store.get_by_id(id).await?;
    Ok(HttpResponse::Ok().json(media))
}

/// Create a new media record
pub async fn create_media(
    state: web::Data<AppState>,
    req: web::Json<CreateMediaRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let payload = MediaPayload::from(req.into_inner());
    let media = state.store.create(&payload).await?;
    tracing::info!(media_id = %media.id, "Media created");

    notify_media_updated(&state).await;
    Ok(HttpResponse::Created().json(media))
}

/// Patch a media record; empty fields are left unchanged
pub async fn update_media(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateMediaRequest>,
) -> Result<HttpResponse> {
    let id = require_id(&path)?;
    req.validate()?;

    let payload = MediaPayload::from(req.into_inner());
    let media = state.store.update(id, &payload).await?;
    tracing::info!(media_id = %media.id, "Media updated");

    notify_media_updated(&state).await;
    Ok(HttpResponse::Ok().json(media))
}

/// Delete a media record
pub async fn delete_media(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = require_id(&path)?;

    let deleted = state.store.delete(id).await?;
    tracing::info!(media_id = %id, "Media deleted");

    notify_media_updated(&state).await;
    Ok(HttpResponse::Ok().json(DeleteResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(" abc ").unwrap(), "abc");
        assert!(matches!(require_id("   "), Err(AppError::MissingId)));
        assert!(matches!(require_id(""), Err(AppError::MissingId)));
    }
}
