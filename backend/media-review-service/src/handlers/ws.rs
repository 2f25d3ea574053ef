/// WebSocket endpoint - realtime change notifications
use actix_web::{web, Error, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;
use crate::websocket::SessionReader;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub client_id: Option<String>,
}

impl WsParams {
    fn client_id(self) -> Result<String, AppError> {
        self.client_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(AppError::MissingId)
    }
}

/// Upgrade to a WebSocket and register the connection under `client_id`
///
/// A client reconnecting with the same id replaces its previous connection.
pub async fn ws_handler(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
    query: web::Query<WsParams>,
) -> Result<HttpResponse, Error> {
    let client_id = query.into_inner().client_id()?;

    let (response, session, stream) = actix_ws::handle(&req, body).map_err(|e| {
        tracing::warn!(client_id = %client_id, error = %e, "WebSocket upgrade failed");
        e
    })?;

    let connection_id = state
        .registry
        .register(client_id.clone(), Box::new(session.clone()))
        .await;

    let reader = SessionReader::new(
        state.registry.clone(),
        client_id,
        connection_id,
        state.config.websocket.idle_timeout,
    );
    actix_web::rt::spawn(reader.run(session, stream));

    Ok(response)
}
