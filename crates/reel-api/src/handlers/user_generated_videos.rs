//! Caption overlay requests and the user's generated videos.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use reel_db::models::GeneratedVideo;
use reel_db::repositories::{GeneratedVideoRepo, SourceVideoRepo};
use reel_pipeline::CaptionRequest;
use reel_storage::{thumbnail_key, video_key, CdnSigner, MediaNamespace, DEFAULT_SIGNED_URL_TTL};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGeneratedVideoRequest {
    pub ai_avatar_video_id: Uuid,
    #[validate(length(min = 1, max = 500, message = "overlay_text must be 1 to 500 characters"))]
    pub overlay_text: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratedVideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ai_avatar_video_id: Uuid,
    pub overlay_text: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl GeneratedVideoResponse {
    /// Build the response with freshly signed media URLs.
    pub fn signed(cdn: &CdnSigner, video: GeneratedVideo) -> ApiResult<Self> {
        let video_url = cdn.sign(
            &video_key(MediaNamespace::UserGenerated, &video.video_filename),
            DEFAULT_SIGNED_URL_TTL,
        )?;
        let thumbnail_url = cdn.sign(
            &thumbnail_key(MediaNamespace::UserGenerated, &video.thumbnail_filename),
            DEFAULT_SIGNED_URL_TTL,
        )?;

        Ok(Self {
            id: video.id,
            user_id: video.user_id,
            ai_avatar_video_id: video.ai_avatar_video_id,
            overlay_text: video.overlay_text,
            video_url: video_url.url,
            thumbnail_url: thumbnail_url.url,
            status: video.status,
            created_at: video.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CreateGeneratedVideoResponse {
    pub video: GeneratedVideoResponse,
}

#[derive(Debug, Serialize)]
pub struct GeneratedVideosResponse {
    pub videos: Vec<GeneratedVideoResponse>,
}

/// Run the caption overlay pipeline for one catalog video.
pub async fn create_user_generated_video(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<CreateGeneratedVideoRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<CreateGeneratedVideoResponse>)> {
    req.validate()?;
    if req.overlay_text.trim().is_empty() {
        return Err(ApiError::validation("overlay_text must not be blank"));
    }

    let source = SourceVideoRepo::find_by_id(&state.db, req.ai_avatar_video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("video_not_found", "AI avatar video not found"))?;

    let video = state
        .pipeline
        .run(CaptionRequest {
            user_id: user.user_id,
            source,
            overlay_text: req.overlay_text,
        })
        .await
        .map_err(|e| ApiError::Processing(e.stage()))?;

    let video = GeneratedVideoResponse::signed(&state.cdn, video)?;
    Ok((StatusCode::CREATED, Json(CreateGeneratedVideoResponse { video })))
}

/// The caller's generated videos, newest first.
pub async fn list_user_generated_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<GeneratedVideosResponse>> {
    let videos = GeneratedVideoRepo::list_by_user(&state.db, user.user_id)
        .await?
        .into_iter()
        .map(|v| GeneratedVideoResponse::signed(&state.cdn, v))
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(GeneratedVideosResponse { videos }))
}
