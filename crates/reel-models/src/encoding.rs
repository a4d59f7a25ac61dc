//! Encoding and caption constants.

/// Offset of the frame used as a thumbnail.
pub const THUMBNAIL_TIMESTAMP: &str = "00:00:01";

/// JPEG quality scale passed to `-q:v` (2 is near-lossless).
pub const THUMBNAIL_QUALITY: u8 = 2;

/// Content type for rendered videos.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Content type for thumbnails.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// Default caption font shipped next to the binary.
pub const DEFAULT_CAPTION_FONT: &str = "./TikTokDisplay-Medium.ttf";

/// Wrap width paired with the 36pt overlay font.
pub const OVERLAY_WRAP_WIDTH: usize = 35;

/// Wrap width paired with the 48pt bold caption font.
pub const BOLD_WRAP_WIDTH: usize = 20;

/// Maximum accepted overlay text length, in characters.
pub const MAX_OVERLAY_TEXT_CHARS: usize = 500;

/// File extensions accepted by the catalog ingester.
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v"];
