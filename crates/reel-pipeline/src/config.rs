//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use reel_media::{CaptionStyle, FfmpegRunner, DEFAULT_FETCH_TIMEOUT};
use reel_models::encoding::DEFAULT_CAPTION_FONT;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent directory for per-run scratch directories
    pub scratch_dir: PathBuf,
    /// Font used for burned-in captions
    pub font_file: PathBuf,
    /// Time budget for downloading a source video
    pub fetch_timeout: Duration,
    /// Optional limit on each FFmpeg invocation
    pub process_timeout: Option<Duration>,
    /// FFmpeg executable
    pub ffmpeg_program: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("/tmp/reel-farm"),
            font_file: PathBuf::from(DEFAULT_CAPTION_FONT),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            process_timeout: None,
            ffmpeg_program: PathBuf::from("ffmpeg"),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            scratch_dir: std::env::var("REEL_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            font_file: std::env::var("CAPTION_FONT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.font_file),
            fetch_timeout: std::env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            process_timeout: std::env::var("MEDIA_PROCESS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            ffmpeg_program: std::env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg_program),
        }
    }

    /// FFmpeg runner honoring the program and timeout settings.
    pub fn runner(&self) -> FfmpegRunner {
        let runner = FfmpegRunner::new().with_program(&self.ffmpeg_program);
        match self.process_timeout {
            Some(timeout) => runner.with_timeout(timeout),
            None => runner,
        }
    }

    /// Caption style for generated videos.
    pub fn overlay_style(&self) -> CaptionStyle {
        CaptionStyle::overlay(&self.font_file)
    }
}
