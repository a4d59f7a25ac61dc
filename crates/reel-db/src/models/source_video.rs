//! Source video catalog models.
//!
//! Rows in `ai_avatar_videos` are written by the ingest tool and read by
//! the API and the caption pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `ai_avatar_videos` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SourceVideo {
    pub id: Uuid,
    pub title: String,
    pub filename: String,
    pub thumbnail_filename: String,
    /// Seconds.
    pub duration: Option<f64>,
    /// Bytes.
    pub file_size: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for cataloguing a new source video.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSourceVideo {
    pub id: Uuid,
    pub title: String,
    pub filename: String,
    pub thumbnail_filename: String,
    pub duration: Option<f64>,
    pub file_size: Option<i64>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Input for updating a catalog entry. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSourceVideo {
    pub title: Option<String>,
    pub filename: Option<String>,
    pub thumbnail_filename: Option<String>,
    pub duration: Option<f64>,
    pub file_size: Option<i64>,
}
