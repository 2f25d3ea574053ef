use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

/// Liveness report for the status endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthCheck;

impl HealthCheck {
    pub fn new() -> Self {
        Self
    }

    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}
