//! Change events pushed to dashboard clients
//!
//! Events carry only their type. Clients re-query the media API on receipt.
//!
//! ```json
//! {"type": "media_updated"}
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A media record was created, updated or deleted
    MediaUpdated,
}

impl ChangeEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeEvent::MediaUpdated => "media_updated",
        }
    }
}
