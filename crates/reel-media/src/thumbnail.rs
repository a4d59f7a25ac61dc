//! Thumbnail extraction.

use std::path::Path;

use reel_models::encoding::{THUMBNAIL_QUALITY, THUMBNAIL_TIMESTAMP};

use crate::command::{FfmpegCommand, FfmpegRunner, ProcessOutput};
use crate::error::MediaResult;

/// Build the command that grabs one frame one second into the video.
pub fn thumbnail_command(video_path: impl AsRef<Path>, output_path: impl AsRef<Path>) -> FfmpegCommand {
    FfmpegCommand::new(video_path, output_path)
        .seek_to(THUMBNAIL_TIMESTAMP)
        .single_frame()
        .quality(THUMBNAIL_QUALITY)
        .log_level("error")
}

/// Extract a still JPEG thumbnail from a video file.
pub async fn extract_thumbnail(
    runner: &FfmpegRunner,
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> MediaResult<ProcessOutput> {
    let cmd = thumbnail_command(video_path, output_path);
    runner.run(&cmd).await
}
