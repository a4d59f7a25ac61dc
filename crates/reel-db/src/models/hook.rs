//! Generated hook model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `hooks` table. One LLM call produces a batch of rows
/// sharing a `generation_id`, ordered by `hook_index`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Hook {
    pub id: Uuid,
    pub user_id: Uuid,
    pub generation_id: Uuid,
    pub prompt: String,
    pub hook_text: String,
    pub hook_index: i32,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}
