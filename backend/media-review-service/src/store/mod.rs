/// Media persistence layer
///
/// This module provides:
/// - The `MediaStore` trait every backend implements
/// - `PgMediaStore`: PostgreSQL through an sqlx pool
/// - `InMemoryMediaStore`: process-local map, used by tests and the
///   `memory` storage backend
use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Media, MediaPayload};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryMediaStore;
pub use postgres::PgMediaStore;

/// Contract shared by all media backends.
///
/// `update` and `delete` check for the record and mutate it as one atomic
/// step; a concurrent delete can't slip in between.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Fetch one record, `AppError::NotFound` when absent.
    async fn get_by_id(&self, id: &str) -> Result<Media>;

    /// Persist a new record under a freshly minted id and return it as stored.
    async fn create(&self, payload: &MediaPayload) -> Result<Media>;

    /// Sparse-patch an existing record and return the full updated record.
    async fn update(&self, id: &str, payload: &MediaPayload) -> Result<Media>;

    /// Remove a record. Returns `true`, or `AppError::NotFound` when absent.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Every record, in store-default order.
    async fn get_all(&self) -> Result<Vec<Media>>;
}

/// Mint a media identifier
pub(crate) fn new_media_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
