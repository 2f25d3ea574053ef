use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod session;

pub use broadcast::{BroadcastReport, NotificationHub};
pub use connection::{ClientConnection, ConnectionClosed};
pub use events::ChangeEvent;
pub use session::SessionReader;

/// Identifies one registration of a client
///
/// A client id can be registered many times over its life; each registration
/// gets a fresh `ConnectionId`, so the reader loop of a replaced connection
/// cannot unregister its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Upper bound on one write or close while the registry lock is held
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Registry entry: the live connection for one client id
pub(crate) struct Registered {
    pub(crate) id: ConnectionId,
    pub(crate) connection: Box<dyn ClientConnection>,
}

impl Registered {
    /// Close the transport, giving up after `limit`
    pub(crate) async fn close_within(&mut self, limit: Duration) {
        if tokio::time::timeout(limit, self.connection.close())
            .await
            .is_err()
        {
            tracing::warn!(connection_id = %self.id, "Timed out closing connection");
        }
    }
}

/// Connection registry for WebSocket clients
///
/// Holds at most one live connection per client id. A single mutex guards
/// the map; registration, removal and the hub's whole broadcast pass run
/// under it. Every connection leaving the map is closed by the registry.
///
/// Writes and closes done under the lock are bounded by `write_timeout`, so
/// a client that stops reading cannot hold the lock.
#[derive(Clone)]
pub struct ConnectionRegistry {
    // client_id -> live connection
    inner: Arc<Mutex<HashMap<String, Registered>>>,
    write_timeout: Duration,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::with_write_timeout(DEFAULT_WRITE_TIMEOUT)
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write_timeout(write_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            write_timeout,
        }
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Install a connection for a client id
    ///
    /// A connection already registered under the same id is closed and
    /// evicted first. Returns the id of this registration.
    pub async fn register(
        &self,
        client_id: impl Into<String>,
        connection: Box<dyn ClientConnection>,
    ) -> ConnectionId {
        let client_id = client_id.into();
        let id = ConnectionId::new();

        let mut guard = self.inner.lock().await;

        if let Some(mut previous) = guard.remove(&client_id) {
            tracing::info!(
                client_id = %client_id,
                evicted = %previous.id,
                "Replacing existing connection for client"
            );
            previous.close_within(self.write_timeout).await;
        }

        guard.insert(client_id.clone(), Registered { id, connection });

        tracing::info!(
            client_id = %client_id,
            connection_id = %id,
            total = guard.len(),
            "Client connection registered"
        );

        id
    }

    /// Remove and close the connection for a client id, if any
    ///
    /// Idempotent. Returns whether an entry was removed.
    pub async fn unregister(&self, client_id: &str) -> bool {
        let mut guard = self.inner.lock().await;

        match guard.remove(client_id) {
            Some(mut entry) => {
                entry.close_within(self.write_timeout).await;
                tracing::info!(
                    client_id = %client_id,
                    remaining = guard.len(),
                    "Client connection unregistered"
                );
                true
            }
            None => false,
        }
    }

    /// Remove and close a client's connection only if it is still the given
    /// registration
    ///
    /// Reader loops call this on exit. When the connection was already
    /// replaced or pruned this is a no-op.
    pub async fn unregister_connection(&self, client_id: &str, connection_id: ConnectionId) -> bool {
        let mut guard = self.inner.lock().await;

        let owned = guard
            .get(client_id)
            .map(|entry| entry.id == connection_id)
            .unwrap_or(false);

        if !owned {
            tracing::debug!(
                client_id = %client_id,
                connection_id = %connection_id,
                "Connection already gone from registry"
            );
            return false;
        }

        if let Some(mut entry) = guard.remove(client_id) {
            entry.close_within(self.write_timeout).await;
        }

        tracing::info!(
            client_id = %client_id,
            connection_id = %connection_id,
            remaining = guard.len(),
            "Client connection closed"
        );

        true
    }

    /// Whether a client id currently has a live connection
    pub async fn contains(&self, client_id: &str) -> bool {
        self.inner.lock().await.contains_key(client_id)
    }

    /// Number of live connections
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Lock the whole map. Only the hub iterates connections.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, HashMap<String, Registered>> {
        self.inner.lock().await
    }
}
