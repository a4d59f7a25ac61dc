//! Persistence seam for finished runs.

use async_trait::async_trait;
use reel_db::models::{CreateGeneratedVideo, GeneratedVideo};
use reel_db::repositories::GeneratedVideoRepo;
use sqlx::PgPool;

/// Stores the result row of a successful run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRecorder: Send + Sync {
    async fn record(&self, video: CreateGeneratedVideo) -> Result<GeneratedVideo, sqlx::Error>;
}

/// Postgres-backed recorder.
#[derive(Debug, Clone)]
pub struct PgVideoRecorder {
    pool: PgPool,
}

impl PgVideoRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRecorder for PgVideoRecorder {
    async fn record(&self, video: CreateGeneratedVideo) -> Result<GeneratedVideo, sqlx::Error> {
        GeneratedVideoRepo::create(&self.pool, &video).await
    }
}
