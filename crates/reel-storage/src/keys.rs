//! Object key layout.
//!
//! ```text
//! ai-avatar/videos/<id>.mp4                 catalog source videos
//! ai-avatar/thumbnails/<id>.jpg
//! user-generated-videos/videos/<id>.mp4     caption pipeline output
//! user-generated-videos/thumbnails/<id>.jpg
//! ```

use uuid::Uuid;

/// Top-level key prefix for a family of media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaNamespace {
    /// Catalog videos used as overlay backgrounds.
    AiAvatar,
    /// Videos produced for users by the caption pipeline.
    UserGenerated,
}

impl MediaNamespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            MediaNamespace::AiAvatar => "ai-avatar",
            MediaNamespace::UserGenerated => "user-generated-videos",
        }
    }
}

/// Key of a video file within a namespace.
pub fn video_key(namespace: MediaNamespace, filename: &str) -> String {
    format!("{}/videos/{}", namespace.prefix(), filename)
}

/// Key of a thumbnail within a namespace.
pub fn thumbnail_key(namespace: MediaNamespace, filename: &str) -> String {
    format!("{}/thumbnails/{}", namespace.prefix(), filename)
}

pub fn video_filename(id: &Uuid) -> String {
    format!("{}.mp4", id)
}

pub fn thumbnail_filename(id: &Uuid) -> String {
    format!("{}.jpg", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let id = Uuid::parse_str("0b7c2d3e-4f50-4a61-8b72-9c83d4e5f607").unwrap();

        assert_eq!(
            video_key(MediaNamespace::UserGenerated, &video_filename(&id)),
            "user-generated-videos/videos/0b7c2d3e-4f50-4a61-8b72-9c83d4e5f607.mp4"
        );
        assert_eq!(
            thumbnail_key(MediaNamespace::UserGenerated, &thumbnail_filename(&id)),
            "user-generated-videos/thumbnails/0b7c2d3e-4f50-4a61-8b72-9c83d4e5f607.jpg"
        );
        assert_eq!(
            video_key(MediaNamespace::AiAvatar, "clip.mov"),
            "ai-avatar/videos/clip.mov"
        );
        assert_eq!(
            thumbnail_key(MediaNamespace::AiAvatar, "clip.jpg"),
            "ai-avatar/thumbnails/clip.jpg"
        );
    }
}
