//! Application state.

use std::sync::Arc;

use reel_db::DbPool;
use reel_media::download_client;
use reel_pipeline::{CaptionOverlayPipeline, PgVideoRecorder, PipelineConfig};
use reel_storage::{BlobStore, CdnSigner, S3Client};

use crate::config::ApiConfig;
use crate::services::{HookService, LlmClient, StripeClient, SubscriptionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub db: DbPool,
    pub storage: Arc<S3Client>,
    pub cdn: Arc<CdnSigner>,
    pub pipeline: Arc<CaptionOverlayPipeline>,
    pub subscriptions: SubscriptionService,
    pub hooks: HookService,
}

impl AppState {
    /// Wire services around already constructed infrastructure.
    pub fn new(
        config: ApiConfig,
        db: DbPool,
        storage: Arc<S3Client>,
        cdn: Arc<CdnSigner>,
        pipeline_config: PipelineConfig,
    ) -> anyhow::Result<Self> {
        let fetch_client = download_client(pipeline_config.fetch_timeout)?;
        let blobs: Arc<dyn BlobStore> = storage.clone();
        let pipeline = CaptionOverlayPipeline::new(
            pipeline_config,
            fetch_client,
            blobs,
            Arc::new(PgVideoRecorder::new(db.clone())),
            Arc::clone(&cdn),
        );

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            subscriptions: SubscriptionService::new(
                db.clone(),
                StripeClient::new(http.clone(), &config.billing),
            ),
            hooks: HookService::new(db.clone(), LlmClient::new(http, config.llm.clone())),
            config,
            db,
            storage,
            cdn,
            pipeline: Arc::new(pipeline),
        })
    }

    /// Connect to the database and read storage, CDN and pipeline settings
    /// from the environment.
    pub async fn from_env(config: ApiConfig) -> anyhow::Result<Self> {
        let db = reel_db::create_pool(&config.database_url, config.db_max_connections).await?;
        reel_db::run_migrations(&db).await?;

        let storage = Arc::new(S3Client::from_env()?);
        let cdn = Arc::new(CdnSigner::from_env()?);

        Self::new(config, db, storage, cdn, PipelineConfig::from_env())
    }
}
