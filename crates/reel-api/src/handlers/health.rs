//! Health check handlers.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use reel_media::FfmpegRunner;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub status: String,
    pub port: String,
}

/// Liveness probe.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Reel Farm API is healthy!!!".to_string(),
        status: "ok".to_string(),
        port: state.config.port.to_string(),
    })
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: CheckStatus,
    pub storage: CheckStatus,
    pub ffmpeg: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn from_result<E: std::fmt::Display>(started: Instant, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "ok".to_string(),
                error: None,
                latency_ms: Some(started.elapsed().as_millis() as u64),
            },
            Err(e) => Self {
                status: "error".to_string(),
                error: Some(e.to_string()),
                latency_ms: None,
            },
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Whether the caption pipeline can find its FFmpeg executable.
pub fn ffmpeg_check(runner: &FfmpegRunner) -> CheckStatus {
    let started = Instant::now();
    CheckStatus::from_result(started, runner.check().map(|_| ()))
}

/// Readiness probe: database round trip, bucket reachability and FFmpeg.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let started = Instant::now();
    let database = CheckStatus::from_result(started, reel_db::health_check(&state.db).await);

    let started = Instant::now();
    let storage = CheckStatus::from_result(started, state.storage.check_connectivity().await);

    let ffmpeg = ffmpeg_check(state.pipeline.runner());

    let all_ok = database.is_ok() && storage.is_ok() && ffmpeg.is_ok();
    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            database,
            storage,
            ffmpeg,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_check_reports_missing_program() {
        let check = ffmpeg_check(&FfmpegRunner::new().with_program("/nonexistent/ffmpeg-binary"));
        assert!(!check.is_ok());
        assert!(check.error.unwrap().contains("/nonexistent/ffmpeg-binary"));
        assert_eq!(check.latency_ms, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_ffmpeg_check_passes_for_resolvable_program() {
        let check = ffmpeg_check(&FfmpegRunner::new().with_program("sh"));
        assert!(check.is_ok());
    }
}
