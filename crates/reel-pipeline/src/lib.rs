//! Caption overlay pipeline.
//!
//! A run fetches a catalog video, burns the overlay text into it, extracts
//! a thumbnail, publishes both to blob storage and records the result.
//! Everything a run writes locally lives in a per-run scratch directory
//! that is removed when the run ends.

pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod overlay;
pub mod recorder;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult, PipelineStage};
pub use logging::{init_tracing, RunLogger};
pub use overlay::{CaptionOverlayPipeline, CaptionRequest};
pub use recorder::{PgVideoRecorder, VideoRecorder};
