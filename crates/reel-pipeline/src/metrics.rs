//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; they are exported only when the
//! host process installs a recorder.

use metrics::{counter, histogram};

use crate::error::PipelineStage;

pub mod names {
    pub const RUNS_TOTAL: &str = "reel_pipeline_runs_total";
    pub const STAGE_DURATION_SECONDS: &str = "reel_pipeline_stage_duration_seconds";
}

/// Record a finished run. `outcome` is `success` or the failed stage name.
pub fn record_run(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::RUNS_TOTAL, &labels).increment(1);
}

pub fn record_stage_duration(stage: PipelineStage, duration_secs: f64) {
    let labels = [("stage", stage.as_str().to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}
