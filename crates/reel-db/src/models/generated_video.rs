//! Generated video models.

use chrono::{DateTime, Utc};
use reel_models::VideoStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `user_generated_videos` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GeneratedVideo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ai_avatar_video_id: Uuid,
    pub overlay_text: String,
    pub video_filename: String,
    pub thumbnail_filename: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording a finished caption run.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGeneratedVideo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ai_avatar_video_id: Uuid,
    pub overlay_text: String,
    pub video_filename: String,
    pub thumbnail_filename: String,
    pub status: VideoStatus,
}
