//! Catalog listing.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use reel_db::models::SourceVideo;
use reel_db::repositories::SourceVideoRepo;
use reel_storage::{thumbnail_key, video_key, CdnSigner, MediaNamespace};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AiAvatarVideoResponse {
    pub id: Uuid,
    pub title: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub updated_at: DateTime<Utc>,
}

impl AiAvatarVideoResponse {
    /// Catalog media is public, so these URLs are unsigned.
    pub fn from_video(cdn: &CdnSigner, video: SourceVideo) -> Self {
        Self {
            id: video.id,
            video_url: cdn.public_url(&video_key(MediaNamespace::AiAvatar, &video.filename)),
            thumbnail_url: cdn.public_url(&thumbnail_key(
                MediaNamespace::AiAvatar,
                &video.thumbnail_filename,
            )),
            title: video.title,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AiAvatarVideosResponse {
    pub videos: Vec<AiAvatarVideoResponse>,
}

pub async fn list_ai_avatar_videos(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<AiAvatarVideosResponse>> {
    let videos = SourceVideoRepo::list_all(&state.db)
        .await?
        .into_iter()
        .map(|v| AiAvatarVideoResponse::from_video(&state.cdn, v))
        .collect();

    Ok(Json(AiAvatarVideosResponse { videos }))
}
