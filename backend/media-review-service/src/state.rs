use crate::{
    config::Config,
    health::HealthCheck,
    store::MediaStore,
    websocket::{ConnectionRegistry, NotificationHub},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MediaStore>,
    pub registry: ConnectionRegistry,
    pub hub: NotificationHub,
    pub health: HealthCheck,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire a store and configuration to a fresh registry and hub
    pub fn new(store: Arc<dyn MediaStore>, config: Config) -> Self {
        let registry = ConnectionRegistry::with_write_timeout(config.websocket.write_timeout);
        let hub = NotificationHub::new(registry.clone());

        Self {
            store,
            registry,
            hub,
            health: HealthCheck::new(),
            config: Arc::new(config),
        }
    }
}
