//! Repository for the `ai_avatar_videos` catalog.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateSourceVideo, SourceVideo, UpdateSourceVideo};

/// Column list for catalog queries.
const COLUMNS: &str =
    "id, title, filename, thumbnail_filename, duration, file_size, created_at, updated_at";

/// Source video catalog operations.
pub struct SourceVideoRepo;

impl SourceVideoRepo {
    /// List the whole catalog, oldest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<SourceVideo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ai_avatar_videos ORDER BY created_at ASC, title ASC");
        sqlx::query_as::<_, SourceVideo>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<SourceVideo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ai_avatar_videos WHERE id = $1");
        sqlx::query_as::<_, SourceVideo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_filename(
        pool: &PgPool,
        filename: &str,
    ) -> Result<Option<SourceVideo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ai_avatar_videos WHERE filename = $1");
        sqlx::query_as::<_, SourceVideo>(&query)
            .bind(filename)
            .fetch_optional(pool)
            .await
    }

    /// Insert a catalog entry, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSourceVideo) -> Result<SourceVideo, sqlx::Error> {
        let query = format!(
            "INSERT INTO ai_avatar_videos (id, title, filename, thumbnail_filename, duration, file_size) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SourceVideo>(&query)
            .bind(input.id)
            .bind(&input.title)
            .bind(&input.filename)
            .bind(&input.thumbnail_filename)
            .bind(input.duration)
            .bind(input.file_size)
            .fetch_one(pool)
            .await
    }

    /// Update an entry. Returns the updated row, or `None` if not found.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &UpdateSourceVideo,
    ) -> Result<Option<SourceVideo>, sqlx::Error> {
        let query = format!(
            "UPDATE ai_avatar_videos SET \
                title = COALESCE($2, title), \
                filename = COALESCE($3, filename), \
                thumbnail_filename = COALESCE($4, thumbnail_filename), \
                duration = COALESCE($5, duration), \
                file_size = COALESCE($6, file_size), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SourceVideo>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.filename)
            .bind(&input.thumbnail_filename)
            .bind(input.duration)
            .bind(input.file_size)
            .fetch_optional(pool)
            .await
    }

    /// Delete an entry. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ai_avatar_videos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM ai_avatar_videos WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
