//! PostgreSQL media store
//!
//! Update and delete run inside a transaction that locks the target row
//! first (`SELECT ... FOR UPDATE`), so the existence check, the mutation and
//! the read-back observe the same row.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, warn};

use super::{new_media_id, MediaStore};
use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{ChangeValue, Media, MediaPayload};

const SELECT_MEDIA: &str = "SELECT id, title, description, location, media_type, mime_type, \
     size, tags, media_data FROM media";

pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to connect to database");
                AppError::StoreUnavailable(e.to_string())
            })?;

        Ok(Self::new(pool))
    }

    /// Apply embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn ensure_open(&self) -> Result<()> {
        if self.pool.is_closed() {
            error!("Database pool is closed");
            return Err(AppError::StoreUnavailable("database pool is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for PgMediaStore {
    async fn get_by_id(&self, id: &str) -> Result<Media> {
        self.ensure_open()?;

        let media = sqlx::query_as::<_, Media>(&format!("{SELECT_MEDIA} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(media_id = %id, error = %e, "Failed to get media by id");
                AppError::from(e)
            })?;

        media.ok_or_else(|| {
            warn!(media_id = %id, "Media not found");
            AppError::NotFound
        })
    }

    async fn create(&self, payload: &MediaPayload) -> Result<Media> {
        self.ensure_open()?;

        let id = new_media_id();
        let media = sqlx::query_as::<_, Media>(
            "INSERT INTO media (id, title, description, location, media_type, mime_type, \
             size, tags, media_data) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id, title, description, location, media_type, mime_type, \
             size, tags, media_data",
        )
        .bind(&id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.location)
        .bind(&payload.media_type)
        .bind(&payload.mime_type)
        .bind(payload.size)
        .bind(&payload.tags)
        .bind(&payload.media_data)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create media");
            AppError::from(e)
        })?;

        debug!(media_id = %media.id, "Media created");
        Ok(media)
    }

    async fn update(&self, id: &str, payload: &MediaPayload) -> Result<Media> {
        self.ensure_open()?;

        let mut tx = self.pool.begin().await?;

        let locked: Option<String> =
            sqlx::query_scalar("SELECT id FROM media WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            warn!(media_id = %id, "Media to update does not exist");
            return Err(AppError::NotFound);
        }

        let changes = payload.changes();
        if !changes.is_empty() {
            let mut builder = QueryBuilder::<Postgres>::new("UPDATE media SET ");
            {
                let mut assignments = builder.separated(", ");
                for change in &changes {
                    assignments.push(format!("{} = ", change.column()));
                    match change.value() {
                        ChangeValue::Text(text) => {
                            assignments.push_bind_unseparated(text.to_string());
                        }
                        ChangeValue::Integer(value) => {
                            assignments.push_bind_unseparated(value);
                        }
                    }
                }
            }
            builder.push(" WHERE id = ").push_bind(id.to_string());

            builder.build().execute(&mut *tx).await.map_err(|e| {
                error!(media_id = %id, error = %e, "Failed to update media");
                AppError::from(e)
            })?;
        }

        let media = sqlx::query_as::<_, Media>(&format!("{SELECT_MEDIA} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound)?;

        tx.commit().await?;

        debug!(media_id = %id, fields = changes.len(), "Media updated");
        Ok(media)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.ensure_open()?;

        let mut tx = self.pool.begin().await?;

        let locked: Option<String> =
            sqlx::query_scalar("SELECT id FROM media WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            warn!(media_id = %id, "Media to delete does not exist");
            return Err(AppError::NotFound);
        }

        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(media_id = %id, error = %e, "Failed to delete media by id");
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        tx.commit().await?;

        debug!(media_id = %id, "Media deleted");
        Ok(true)
    }

    async fn get_all(&self) -> Result<Vec<Media>> {
        self.ensure_open()?;

        let media = sqlx::query_as::<_, Media>(SELECT_MEDIA)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list media");
                AppError::from(e)
            })?;

        Ok(media)
    }
}
