//! Pipeline error types.
//!
//! One variant per stage. Every variant is terminal for the run.

use std::fmt;

use reel_media::MediaError;
use reel_storage::StorageError;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Stage of a caption overlay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Fetch,
    Render,
    Thumbnail,
    Publish,
    Persist,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Fetch => "fetch",
            PipelineStage::Render => "render",
            PipelineStage::Thumbnail => "thumbnail",
            PipelineStage::Publish => "publish",
            PipelineStage::Persist => "persist",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch source video: {0}")]
    Fetch(#[source] MediaError),

    #[error("Failed to render caption: {0}")]
    Render(#[source] MediaError),

    #[error("Failed to extract thumbnail: {0}")]
    Thumbnail(#[source] MediaError),

    #[error("Failed to publish outputs: {0}")]
    Publish(#[source] StorageError),

    #[error("Failed to record generated video: {0}")]
    Persist(#[source] sqlx::Error),
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Fetch(_) => PipelineStage::Fetch,
            PipelineError::Render(_) => PipelineStage::Render,
            PipelineError::Thumbnail(_) => PipelineStage::Thumbnail,
            PipelineError::Publish(_) => PipelineStage::Publish,
            PipelineError::Persist(_) => PipelineStage::Persist,
        }
    }

    /// Captured process output, for render and thumbnail failures.
    pub fn process_output(&self) -> Option<&str> {
        match self {
            PipelineError::Render(e) | PipelineError::Thumbnail(e) => e.process_output(),
            _ => None,
        }
    }
}
