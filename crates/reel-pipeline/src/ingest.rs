//! Catalog ingestion.
//!
//! Walks a directory of source videos and publishes each one to the
//! `ai-avatar` namespace with a thumbnail and a catalog row. Ids are
//! derived from the file name, so re-running over the same directory skips
//! videos that are already catalogued.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reel_db::models::CreateSourceVideo;
use reel_db::repositories::SourceVideoRepo;
use reel_media::{extract_thumbnail, probe_video, FfmpegRunner};
use reel_models::encoding::{SUPPORTED_VIDEO_EXTENSIONS, THUMBNAIL_CONTENT_TYPE};
use reel_storage::{thumbnail_filename, thumbnail_key, video_key, BlobStore, MediaNamespace};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of ingesting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested(Uuid),
    AlreadyPresent(Uuid),
}

/// Totals for a directory run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub ingested: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.ingested + self.skipped + self.failed
    }
}

/// Deterministic catalog id for a source file name.
pub fn source_video_id(file_name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, file_name.as_bytes())
}

/// Lowercased extension if it names a supported container.
pub fn supported_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    SUPPORTED_VIDEO_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

/// Content type for an upload, from its extension.
pub fn video_content_type(ext: &str) -> &'static str {
    match ext {
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        _ => "video/mp4",
    }
}

/// Recursively collect supported video files under `dir`, sorted by path.
pub fn discover_videos(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if supported_extension(&path).is_some() {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Publishes local videos into the catalog.
pub struct Ingestor {
    pool: PgPool,
    blobs: Arc<dyn BlobStore>,
    runner: FfmpegRunner,
    scratch_dir: PathBuf,
}

impl Ingestor {
    pub fn new(
        pool: PgPool,
        blobs: Arc<dyn BlobStore>,
        runner: FfmpegRunner,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pool,
            blobs,
            runner,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Ingest every supported file; failures are logged and counted.
    pub async fn ingest_all(&self, files: &[PathBuf]) -> IngestReport {
        let mut report = IngestReport::default();

        for (i, file) in files.iter().enumerate() {
            info!("Processing video {}/{}: {}", i + 1, files.len(), file.display());
            match self.ingest_file(file).await {
                Ok(IngestOutcome::Ingested(id)) => {
                    info!(video_id = %id, "Ingested {}", file.display());
                    report.ingested += 1;
                }
                Ok(IngestOutcome::AlreadyPresent(id)) => {
                    info!(video_id = %id, "Already catalogued: {}", file.display());
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("Failed to ingest {}: {:#}", file.display(), e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Publish one file: thumbnail, probe, uploads, catalog row.
    pub async fn ingest_file(&self, path: &Path) -> anyhow::Result<IngestOutcome> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("file name is not valid UTF-8"))?;
        let ext = supported_extension(path)
            .ok_or_else(|| anyhow::anyhow!("unsupported video extension"))?;
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name)
            .to_string();

        let id = source_video_id(file_name);
        if SourceVideoRepo::exists(&self.pool, id).await? {
            return Ok(IngestOutcome::AlreadyPresent(id));
        }

        let file_size = tokio::fs::metadata(path).await?.len() as i64;

        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix("reel-ingest-")
            .tempdir_in(&self.scratch_dir)?;

        let thumb_name = thumbnail_filename(&id);
        let thumbnail = scratch.path().join(&thumb_name);
        extract_thumbnail(&self.runner, path, &thumbnail).await?;
        let info = probe_video(path).await?;

        let video_name = format!("{}.{}", id, ext);
        let video_object = video_key(MediaNamespace::AiAvatar, &video_name);
        let thumb_object = thumbnail_key(MediaNamespace::AiAvatar, &thumb_name);

        self.blobs
            .upload_file(path, &video_object, video_content_type(&ext))
            .await?;
        self.blobs
            .upload_file(&thumbnail, &thumb_object, THUMBNAIL_CONTENT_TYPE)
            .await?;

        SourceVideoRepo::create(
            &self.pool,
            &CreateSourceVideo {
                id,
                title,
                filename: video_name,
                thumbnail_filename: thumb_name,
                duration: Some(info.duration),
                file_size: Some(file_size),
            },
        )
        .await?;

        Ok(IngestOutcome::Ingested(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_is_stable_per_name() {
        assert_eq!(source_video_id("plants.mp4"), source_video_id("plants.mp4"));
        assert_ne!(source_video_id("plants.mp4"), source_video_id("plants.mov"));
        assert_eq!(source_video_id("plants.mp4").get_version_num(), 5);
    }

    #[test]
    fn test_supported_extensions() {
        assert_eq!(supported_extension(Path::new("a/B.MP4")), Some("mp4".to_string()));
        assert_eq!(supported_extension(Path::new("clip.webm")), Some("webm".to_string()));
        assert_eq!(supported_extension(Path::new("notes.txt")), None);
        assert_eq!(supported_extension(Path::new("no_extension")), None);
        assert_eq!(video_content_type("mov"), "video/quicktime");
        assert_eq!(video_content_type("m4v"), "video/mp4");
    }

    #[test]
    fn test_discover_videos_walks_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        for name in ["b.mp4", "a.mov", "readme.md"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::write(nested.join("c.MKV"), b"x").unwrap();

        let found = discover_videos(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.mov", "b.mp4", "nested/c.MKV"]);
    }

    #[test]
    fn test_report_total() {
        let report = IngestReport {
            ingested: 2,
            skipped: 1,
            failed: 1,
        };
        assert_eq!(report.total(), 4);
    }
}
