//! Inbound side of a WebSocket connection
//!
//! Each registered connection gets one `SessionReader` task. It drains
//! inbound frames until the peer goes away, then unregisters its own
//! registration. Clients are not expected to send anything meaningful; text
//! frames are only logged.

use std::pin::pin;
use std::time::{Duration, Instant};

use actix_ws::{Message, MessageStream, Session};
use futures_util::{Stream, StreamExt};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{ClientConnection, ConnectionId, ConnectionRegistry};

/// Why a reader loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Peer sent a close frame
    PeerClosed,
    /// Inbound stream ended
    StreamEnded,
    /// Inbound frame could not be decoded
    ProtocolError(String),
    /// Our own writes fail; the session was closed elsewhere
    TransportClosed,
    /// Nothing received within the idle timeout
    IdleTimeout,
}

/// What to do with one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FrameAction {
    Continue,
    Pong(Vec<u8>),
    Stop(SessionEnd),
}

pub(crate) fn classify(message: &Message) -> FrameAction {
    match message {
        Message::Ping(bytes) => FrameAction::Pong(bytes.to_vec()),
        Message::Pong(_) => FrameAction::Continue,
        Message::Text(text) => {
            debug!(message = %text, "WebSocket text frame received");
            FrameAction::Continue
        }
        Message::Binary(bytes) => {
            debug!(len = bytes.len(), "WebSocket binary frame ignored");
            FrameAction::Continue
        }
        Message::Close(reason) => {
            debug!(?reason, "WebSocket close frame received");
            FrameAction::Stop(SessionEnd::PeerClosed)
        }
        _ => FrameAction::Continue,
    }
}

pub struct SessionReader {
    registry: ConnectionRegistry,
    client_id: String,
    connection_id: ConnectionId,
    idle_timeout: Option<Duration>,
}

impl SessionReader {
    pub fn new(
        registry: ConnectionRegistry,
        client_id: String,
        connection_id: ConnectionId,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            registry,
            client_id,
            connection_id,
            idle_timeout,
        }
    }

    /// Drive an actix-ws session until it closes, then unregister it
    pub async fn run(self, mut session: Session, stream: MessageStream) -> SessionEnd {
        self.drive(&mut session, stream).await
    }

    /// Reader loop over any frame stream
    ///
    /// `connection` is only used for heartbeat pings and pong replies; the
    /// registry owns the handle that gets closed.
    pub async fn drive<C, S, E>(self, connection: &mut C, stream: S) -> SessionEnd
    where
        C: ClientConnection + ?Sized,
        S: Stream<Item = Result<Message, E>>,
        E: std::fmt::Display,
    {
        let mut stream = pin!(stream);
        let mut heartbeat = self.idle_timeout.map(|idle| {
            let mut ticker = interval((idle / 3).max(Duration::from_millis(100)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let mut last_seen = Instant::now();

        let end = loop {
            let frame = tokio::select! {
                frame = stream.next() => frame,
                _ = tick(&mut heartbeat) => {
                    if let Some(idle) = self.idle_timeout {
                        if last_seen.elapsed() > idle {
                            break SessionEnd::IdleTimeout;
                        }
                    }
                    if connection.ping(b"").await.is_err() {
                        break SessionEnd::TransportClosed;
                    }
                    continue;
                }
            };

            last_seen = Instant::now();

            let message = match frame {
                None => break SessionEnd::StreamEnded,
                Some(Err(e)) => break SessionEnd::ProtocolError(e.to_string()),
                Some(Ok(message)) => message,
            };

            match classify(&message) {
                FrameAction::Continue => {}
                FrameAction::Pong(bytes) => {
                    if connection.pong(&bytes).await.is_err() {
                        break SessionEnd::TransportClosed;
                    }
                }
                FrameAction::Stop(end) => break end,
            }
        };

        match &end {
            SessionEnd::PeerClosed | SessionEnd::StreamEnded => {
                info!(client_id = %self.client_id, reason = ?end, "WebSocket session ended");
            }
            _ => {
                warn!(client_id = %self.client_id, reason = ?end, "WebSocket session terminated");
            }
        }

        self.registry
            .unregister_connection(&self.client_id, self.connection_id)
            .await;

        end
    }
}

async fn tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
