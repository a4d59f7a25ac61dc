//! Burn a caption onto a local video with the bold preset.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use reel_media::{burn_caption, CaptionStyle, FfmpegRunner};
use reel_models::encoding::{BOLD_WRAP_WIDTH, DEFAULT_CAPTION_FONT};
use reel_pipeline::init_tracing;

#[derive(Parser)]
#[command(name = "reel-caption")]
#[command(about = "Burn centered caption text into a video")]
struct Cli {
    /// Source video
    #[arg(long)]
    input: PathBuf,

    /// Output video
    #[arg(long)]
    output: PathBuf,

    /// Caption text
    #[arg(long)]
    text: String,

    /// Font file
    #[arg(long, default_value = DEFAULT_CAPTION_FONT)]
    font: PathBuf,

    /// Maximum characters per line
    #[arg(long, default_value_t = BOLD_WRAP_WIDTH)]
    wrap_width: usize,

    /// FFmpeg executable
    #[arg(long, env = "FFMPEG_PATH", default_value = "ffmpeg")]
    ffmpeg: PathBuf,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        error!("Caption failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if !cli.input.exists() {
        anyhow::bail!("input file not found: {}", cli.input.display());
    }

    let style = CaptionStyle::bold(&cli.font).with_wrap_width(cli.wrap_width);
    let runner = FfmpegRunner::new().with_program(&cli.ffmpeg);
    let scratch_dir = cli
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);

    burn_caption(&runner, &cli.input, &cli.output, &cli.text, &style, &scratch_dir)
        .await
        .with_context(|| format!("failed to caption {}", cli.input.display()))?;

    info!("Wrote {}", cli.output.display());
    Ok(())
}
