//! Write side of a live client connection

use async_trait::async_trait;
use thiserror::Error;

/// Returned when a frame can no longer be written to a connection
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("connection closed")]
pub struct ConnectionClosed;

/// Transport handle owned by the `ConnectionRegistry`.
///
/// The registry closes every connection it removes, so `close` is called at
/// most once per registered connection.
#[async_trait]
pub trait ClientConnection: Send {
    /// Write one text frame
    async fn send_text(&mut self, text: &str) -> Result<(), ConnectionClosed>;

    /// Heartbeat ping
    async fn ping(&mut self, payload: &[u8]) -> Result<(), ConnectionClosed>;

    /// Answer a peer ping
    async fn pong(&mut self, payload: &[u8]) -> Result<(), ConnectionClosed>;

    /// Close the transport. Errors are swallowed: the peer may already be gone.
    async fn close(&mut self);
}

#[async_trait]
impl ClientConnection for actix_ws::Session {
    async fn send_text(&mut self, text: &str) -> Result<(), ConnectionClosed> {
        self.text(text.to_owned()).await.map_err(|_| ConnectionClosed)
    }

    async fn ping(&mut self, payload: &[u8]) -> Result<(), ConnectionClosed> {
        actix_ws::Session::ping(self, payload)
            .await
            .map_err(|_| ConnectionClosed)
    }

    async fn pong(&mut self, payload: &[u8]) -> Result<(), ConnectionClosed> {
        actix_ws::Session::pong(self, payload)
            .await
            .map_err(|_| ConnectionClosed)
    }

    async fn close(&mut self) {
        // Clones share the closed flag, so closing one closes them all.
        let _ = actix_ws::Session::close(self.clone(), None).await;
    }
}
