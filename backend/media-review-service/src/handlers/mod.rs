/// HTTP handlers for media-review endpoints
///
/// This module contains handlers for:
/// - Media: CRUD over media records, each successful mutation broadcasts
///   `media_updated`
/// - Health: service status
/// - WebSocket: realtime change notifications
pub mod health;
pub mod media;
pub mod ws;

// Explicit re-exports to avoid ambiguity
pub use health::server_status;
pub use media::{create_media, delete_media, get_media, list_media, update_media};
pub use ws::ws_handler;
