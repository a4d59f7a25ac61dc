//! Repository for the `user_generated_videos` table.
//!
//! Rows are written once, at the end of a successful caption run, and
//! never updated.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateGeneratedVideo, GeneratedVideo};

/// Column list for generated video queries.
const COLUMNS: &str = "id, user_id, ai_avatar_video_id, overlay_text, video_filename, \
    thumbnail_filename, status, created_at, updated_at";

/// Generated video operations.
pub struct GeneratedVideoRepo;

impl GeneratedVideoRepo {
    /// Insert a finished run, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGeneratedVideo,
    ) -> Result<GeneratedVideo, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_generated_videos \
                (id, user_id, ai_avatar_video_id, overlay_text, video_filename, thumbnail_filename, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedVideo>(&query)
            .bind(input.id)
            .bind(input.user_id)
            .bind(input.ai_avatar_video_id)
            .bind(&input.overlay_text)
            .bind(&input.video_filename)
            .bind(&input.thumbnail_filename)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<GeneratedVideo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_generated_videos WHERE id = $1");
        sqlx::query_as::<_, GeneratedVideo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's videos, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_generated_videos \
             WHERE user_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, GeneratedVideo>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
