//! Source video download into scratch files.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Default time budget for a whole source download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Build the HTTP client used for source downloads.
pub fn download_client(timeout: Duration) -> MediaResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MediaError::download_failed(format!("failed to build HTTP client: {}", e)))
}

/// Download `url` into a new temporary file under `scratch_dir`.
///
/// The returned handle owns the file and deletes it on drop. On any error
/// the partially written file is dropped, and therefore removed, before
/// this function returns.
pub async fn fetch_to_scratch(
    client: &Client,
    url: &str,
    scratch_dir: impl AsRef<Path>,
) -> MediaResult<NamedTempFile> {
    debug!("Downloading {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::download_failed(format!(
            "HTTP {} fetching {}",
            status.as_u16(),
            url
        )));
    }

    let scratch = tempfile::Builder::new()
        .prefix("original_")
        .suffix(".mp4")
        .tempfile_in(scratch_dir.as_ref())?;

    let mut file = tokio::fs::File::from_std(scratch.reopen()?);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| MediaError::download_failed(format!("reading body of {} failed: {}", url, e)))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    info!(bytes = written, "Downloaded {} to {}", url, scratch.path().display());
    Ok(scratch)
}
