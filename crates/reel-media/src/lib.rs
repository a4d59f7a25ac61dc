//! FFmpeg CLI wrapper for video processing.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - A process runner that drains stdout and stderr concurrently
//! - Caption word wrapping and `drawtext` burn-in
//! - Thumbnail extraction and ffprobe metadata
//! - Source downloads into self-deleting scratch files

pub mod caption;
pub mod command;
pub mod download;
pub mod error;
pub mod probe;
pub mod thumbnail;

pub use caption::{burn_caption, drawtext_filter, wrap_text, CaptionStyle};
pub use command::{FfmpegCommand, FfmpegRunner, ProcessOutput};
pub use download::{download_client, fetch_to_scratch, DEFAULT_FETCH_TIMEOUT};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_video, VideoInfo};
pub use thumbnail::extract_thumbnail;
