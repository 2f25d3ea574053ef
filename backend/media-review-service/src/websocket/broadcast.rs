//! Notification hub
//!
//! Fans a change event out to every registered connection. Connections whose
//! write fails or does not finish within the registry's write timeout are
//! closed and removed inside the same locked pass.

use tokio::time::timeout;
use tracing::{debug, error, warn};

use super::{ChangeEvent, ConnectionRegistry};

/// Outcome of one broadcast pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub evicted: usize,
}

#[derive(Clone)]
pub struct NotificationHub {
    registry: ConnectionRegistry,
}

impl NotificationHub {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Write `event` to every registered connection
    ///
    /// Best effort: failures are logged and reflected in the report, never
    /// returned as errors.
    pub async fn broadcast(&self, event: &ChangeEvent) -> BroadcastReport {
        let payload = match event.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                error!(event = event.as_str(), error = %e, "Failed to serialize change event");
                return BroadcastReport::default();
            }
        };

        let write_timeout = self.registry.write_timeout();
        let mut connections = self.registry.lock().await;
        let mut report = BroadcastReport::default();
        let mut dead = Vec::new();

        for (client_id, entry) in connections.iter_mut() {
            match timeout(write_timeout, entry.connection.send_text(&payload)).await {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    warn!(
                        client_id = %client_id,
                        connection_id = %entry.id,
                        error = %e,
                        "Failed to deliver event, evicting connection"
                    );
                    dead.push(client_id.clone());
                }
                Err(_) => {
                    warn!(
                        client_id = %client_id,
                        connection_id = %entry.id,
                        timeout_ms = write_timeout.as_millis() as u64,
                        "Client stopped reading, evicting connection"
                    );
                    dead.push(client_id.clone());
                }
            }
        }

        for client_id in dead {
            if let Some(mut entry) = connections.remove(&client_id) {
                entry.close_within(write_timeout).await;
                report.evicted += 1;
            }
        }

        debug!(
            event = event.as_str(),
            delivered = report.delivered,
            evicted = report.evicted,
            active = connections.len(),
            "Broadcast complete"
        );

        report
    }
}
