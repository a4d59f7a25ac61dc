//! Caption overlay pipeline.
//!
//! Stages run strictly in order and the first failure ends the run:
//!
//! 1. fetch the catalog video from the CDN into scratch space
//! 2. burn the wrapped overlay text into every frame
//! 3. grab a thumbnail at one second
//! 4. upload video and thumbnail under fresh keys
//! 5. record the result row
//!
//! Nothing is retried. Two identical requests produce two independent
//! results with their own ids and keys.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use reel_db::models::{CreateGeneratedVideo, GeneratedVideo, SourceVideo};
use reel_media::{burn_caption, extract_thumbnail, fetch_to_scratch, CaptionStyle, FfmpegRunner, MediaError};
use reel_models::encoding::{THUMBNAIL_CONTENT_TYPE, VIDEO_CONTENT_TYPE};
use reel_models::VideoStatus;
use reel_storage::{
    thumbnail_filename, thumbnail_key, video_filename, video_key, BlobStore, CdnSigner,
    MediaNamespace,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult, PipelineStage};
use crate::logging::RunLogger;
use crate::metrics;
use crate::recorder::VideoRecorder;

/// One caption overlay request.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub user_id: Uuid,
    pub source: SourceVideo,
    pub overlay_text: String,
}

/// Runs caption overlays. Holds only shared, immutable collaborators, so
/// one instance serves any number of concurrent runs.
#[derive(Clone)]
pub struct CaptionOverlayPipeline {
    config: PipelineConfig,
    http: reqwest::Client,
    runner: FfmpegRunner,
    style: CaptionStyle,
    blobs: Arc<dyn BlobStore>,
    recorder: Arc<dyn VideoRecorder>,
    cdn: Arc<CdnSigner>,
}

impl CaptionOverlayPipeline {
    pub fn new(
        config: PipelineConfig,
        http: reqwest::Client,
        blobs: Arc<dyn BlobStore>,
        recorder: Arc<dyn VideoRecorder>,
        cdn: Arc<CdnSigner>,
    ) -> Self {
        Self {
            runner: config.runner(),
            style: config.overlay_style(),
            config,
            http,
            blobs,
            recorder,
            cdn,
        }
    }

    /// Override the caption style.
    pub fn with_style(mut self, style: CaptionStyle) -> Self {
        self.style = style;
        self
    }

    /// FFmpeg runner used for the render and thumbnail stages.
    pub fn runner(&self) -> &FfmpegRunner {
        &self.runner
    }

    /// Run the pipeline for one request.
    pub async fn run(&self, request: CaptionRequest) -> PipelineResult<GeneratedVideo> {
        let id = Uuid::new_v4();
        let logger = RunLogger::new(id, request.user_id);
        let span = logger.create_span();

        let result = self.execute(id, &request, &logger).instrument(span).await;

        match &result {
            Ok(video) => {
                metrics::record_run("success");
                logger.log_completion(&video.video_filename);
            }
            Err(e) => {
                metrics::record_run(e.stage().as_str());
                logger.log_failure(e.stage(), &e.to_string());
            }
        }

        result
    }

    async fn execute(
        &self,
        id: Uuid,
        request: &CaptionRequest,
        logger: &RunLogger,
    ) -> PipelineResult<GeneratedVideo> {
        logger.log_start(&request.source.filename);

        tokio::fs::create_dir_all(&self.config.scratch_dir)
            .await
            .map_err(|e| PipelineError::Fetch(MediaError::Io(e)))?;
        let scratch = tempfile::Builder::new()
            .prefix("reel-run-")
            .tempdir_in(&self.config.scratch_dir)
            .map_err(|e| PipelineError::Fetch(MediaError::Io(e)))?;

        // Fetch
        let started = Instant::now();
        let source_url = self
            .cdn
            .public_url(&video_key(MediaNamespace::AiAvatar, &request.source.filename));
        let source = fetch_to_scratch(&self.http, &source_url, scratch.path())
            .await
            .map_err(PipelineError::Fetch)?;
        finish_stage(logger, PipelineStage::Fetch, started);

        // Render
        let started = Instant::now();
        let video_name = video_filename(&id);
        let rendered = scratch.path().join(&video_name);
        burn_caption(
            &self.runner,
            source.path(),
            &rendered,
            &request.overlay_text,
            &self.style,
            scratch.path(),
        )
        .await
        .map_err(PipelineError::Render)?;
        finish_stage(logger, PipelineStage::Render, started);

        // Thumbnail
        let started = Instant::now();
        let thumb_name = thumbnail_filename(&id);
        let thumbnail = scratch.path().join(&thumb_name);
        extract_thumbnail(&self.runner, &rendered, &thumbnail)
            .await
            .map_err(PipelineError::Thumbnail)?;
        finish_stage(logger, PipelineStage::Thumbnail, started);

        // Publish
        let started = Instant::now();
        let video_object = video_key(MediaNamespace::UserGenerated, &video_name);
        let thumb_object = thumbnail_key(MediaNamespace::UserGenerated, &thumb_name);
        self.publish(&rendered, &video_object, &thumbnail, &thumb_object, logger)
            .await?;
        finish_stage(logger, PipelineStage::Publish, started);

        // Persist
        let started = Instant::now();
        let record = CreateGeneratedVideo {
            id,
            user_id: request.user_id,
            ai_avatar_video_id: request.source.id,
            overlay_text: request.overlay_text.clone(),
            video_filename: video_name,
            thumbnail_filename: thumb_name,
            status: VideoStatus::Completed,
        };
        match self.recorder.record(record).await {
            Ok(video) => {
                finish_stage(logger, PipelineStage::Persist, started);
                Ok(video)
            }
            Err(e) => {
                self.discard(&[&video_object, &thumb_object], logger).await;
                Err(PipelineError::Persist(e))
            }
        }
    }

    /// Upload the video, then the thumbnail. A failed thumbnail upload
    /// removes the already uploaded video.
    async fn publish(
        &self,
        video: &Path,
        video_object: &str,
        thumbnail: &Path,
        thumb_object: &str,
        logger: &RunLogger,
    ) -> PipelineResult<()> {
        self.blobs
            .upload_file(video, video_object, VIDEO_CONTENT_TYPE)
            .await
            .map_err(PipelineError::Publish)?;

        if let Err(e) = self
            .blobs
            .upload_file(thumbnail, thumb_object, THUMBNAIL_CONTENT_TYPE)
            .await
        {
            self.discard(&[video_object], logger).await;
            return Err(PipelineError::Publish(e));
        }

        Ok(())
    }

    /// Best-effort removal of published objects after a later failure.
    async fn discard(&self, keys: &[&str], logger: &RunLogger) {
        for key in keys {
            if let Err(e) = self.blobs.delete_object(key).await {
                logger.log_warning(&format!("failed to remove orphaned object {}: {}", key, e));
            }
        }
    }
}

fn finish_stage(logger: &RunLogger, stage: PipelineStage, started: Instant) {
    let elapsed = started.elapsed();
    metrics::record_stage_duration(stage, elapsed.as_secs_f64());
    logger.log_stage(stage, elapsed);
}
