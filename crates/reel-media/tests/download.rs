//! Download behaviour against a local HTTP server.

use std::time::Duration;

use reel_media::{download_client, fetch_to_scratch, MediaError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn entries(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_fetch_writes_body_to_scratch_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ai-avatar/videos/source.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 64 * 1024]))
        .mount(&server)
        .await;

    let scratch = tempfile::tempdir().unwrap();
    let client = download_client(Duration::from_secs(10)).unwrap();
    let url = format!("{}/ai-avatar/videos/source.mp4", server.uri());

    let file = fetch_to_scratch(&client, &url, scratch.path()).await.unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    assert_eq!(bytes.len(), 64 * 1024);
    assert!(file
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("original_"));

    drop(file);
    assert_eq!(entries(scratch.path()), 0, "scratch file must be removed on drop");
}

#[tokio::test]
async fn test_fetch_404_fails_and_leaves_nothing_behind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let scratch = tempfile::tempdir().unwrap();
    let client = download_client(Duration::from_secs(10)).unwrap();
    let url = format!("{}/missing.mp4", server.uri());

    let err = fetch_to_scratch(&client, &url, scratch.path())
        .await
        .unwrap_err();

    match err {
        MediaError::DownloadFailed { message } => assert!(message.contains("HTTP 404")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(entries(scratch.path()), 0);
}

#[tokio::test]
async fn test_fetch_timeout_is_a_download_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let scratch = tempfile::tempdir().unwrap();
    let client = download_client(Duration::from_millis(200)).unwrap();
    let url = format!("{}/slow.mp4", server.uri());

    let err = fetch_to_scratch(&client, &url, scratch.path())
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::DownloadFailed { .. }));
    assert_eq!(entries(scratch.path()), 0);
}
