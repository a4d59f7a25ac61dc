//! Structured run logging.
//!
//! [`RunLogger`] stamps every pipeline event with the run and user ids so a
//! run can be followed through the logs. [`init_tracing`] sets up the
//! subscriber for the operator binaries.

use std::time::Duration;

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use crate::error::PipelineStage;

/// Logger for one caption overlay run.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    user_id: String,
}

impl RunLogger {
    pub fn new(run_id: Uuid, user_id: Uuid) -> Self {
        Self {
            run_id: run_id.to_string(),
            user_id: user_id.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            user_id = %self.user_id,
            "Run started: {}", message
        );
    }

    /// Log a finished stage with its duration.
    pub fn log_stage(&self, stage: PipelineStage, elapsed: Duration) {
        info!(
            run_id = %self.run_id,
            user_id = %self.user_id,
            stage = %stage,
            duration_ms = elapsed.as_millis() as u64,
            "Stage completed"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            user_id = %self.user_id,
            "Run warning: {}", message
        );
    }

    pub fn log_failure(&self, stage: PipelineStage, message: &str) {
        error!(
            run_id = %self.run_id,
            user_id = %self.user_id,
            stage = %stage,
            "Run failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            user_id = %self.user_id,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Span carrying the run's identifiers.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "caption_run",
            run_id = %self.run_id,
            user_id = %self.user_id
        )
    }
}

/// Initialise tracing: JSON when `LOG_FORMAT=json`, ANSI text otherwise.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reel=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
}
