//! Catalog ingestion tool.
//!
//! Publishes every supported video under a directory to the `ai-avatar`
//! namespace and records it in the catalog.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use reel_pipeline::ingest::{discover_videos, source_video_id, Ingestor};
use reel_pipeline::{init_tracing, PipelineConfig};
use reel_storage::S3Client;

#[derive(Parser)]
#[command(name = "reel-ingest")]
#[command(about = "Upload source videos and thumbnails to the catalog")]
struct Cli {
    /// Directory to scan for videos
    #[arg(default_value = "videos")]
    dir: PathBuf,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// List what would be ingested without uploading anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    match run(Cli::parse()).await {
        Ok(0) => {}
        Ok(failed) => {
            error!("{} video(s) failed to ingest", failed);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Ingest aborted: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns the number of failed files.
async fn run(cli: Cli) -> anyhow::Result<usize> {
    let files = discover_videos(&cli.dir)
        .with_context(|| format!("failed to scan {}", cli.dir.display()))?;

    if files.is_empty() {
        anyhow::bail!(
            "no video files found in {} (supported: .mp4 .mov .avi .mkv .webm .m4v)",
            cli.dir.display()
        );
    }
    info!("Found {} video file(s) in {}", files.len(), cli.dir.display());

    if cli.dry_run {
        for file in &files {
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            println!("{}  {}", source_video_id(name), file.display());
        }
        return Ok(0);
    }

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    let database_url = cli
        .database_url
        .context("DATABASE_URL environment variable is required")?;
    let pool = reel_db::create_pool(&database_url, 5)
        .await
        .context("failed to connect to database")?;
    let storage = S3Client::from_env().context("failed to configure storage")?;

    let config = PipelineConfig::from_env();
    let ingestor = Ingestor::new(pool, Arc::new(storage), config.runner(), &config.scratch_dir);

    let report = ingestor.ingest_all(&files).await;
    info!(
        ingested = report.ingested,
        skipped = report.skipped,
        failed = report.failed,
        "Ingest finished: {} file(s)",
        report.total()
    );

    Ok(report.failed)
}
