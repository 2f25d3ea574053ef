//! In-memory media store
//!
//! Records live in a `HashMap` behind one `RwLock`. Update and delete take
//! the write lock for the whole check-and-mutate step.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{new_media_id, MediaStore};
use crate::error::{AppError, Result};
use crate::models::{Media, MediaPayload};

#[derive(Clone, Default)]
pub struct InMemoryMediaStore {
    records: Arc<RwLock<HashMap<String, Media>>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn get_by_id(&self, id: &str) -> Result<Media> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn create(&self, payload: &MediaPayload) -> Result<Media> {
        let mut records = self.records.write().await;

        let mut id = new_media_id();
        while records.contains_key(&id) {
            id = new_media_id();
        }

        let media = Media::from_payload(id.clone(), payload);
        records.insert(id.clone(), media.clone());
        tracing::debug!(media_id = %id, "Media created");

        Ok(media)
    }

    async fn update(&self, id: &str, payload: &MediaPayload) -> Result<Media> {
        let mut records = self.records.write().await;

        let Some(media) = records.get_mut(id) else {
            tracing::warn!(media_id = %id, "Media to update does not exist");
            return Err(AppError::NotFound);
        };

        media.apply(&payload.changes());
        tracing::debug!(media_id = %id, "Media updated");
        Ok(media.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;

        if records.remove(id).is_none() {
            tracing::warn!(media_id = %id, "Media to delete does not exist");
            return Err(AppError::NotFound);
        }

        tracing::debug!(media_id = %id, "Media deleted");
        Ok(true)
    }

    async fn get_all(&self) -> Result<Vec<Media>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
