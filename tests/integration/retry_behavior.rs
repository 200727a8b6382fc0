//! Retry, backoff and partial-file handling of the file fetcher

use bgp_archive_downloader::downloader::config::RetryPolicy;
use bgp_archive_downloader::downloader::{DownloadError, DownloadExecutor, DownloadRequest};
use bgp_archive_downloader::fetcher::{DownloadOutcome, FetcherError, FileFetcher};
use bgp_archive_downloader::source::Source;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::support::mock_transport::MockTransport;

const FILE_URL: &str = "https://data.ris.ripe.net/rrc00/2014.03/bview.20140301.0000.gz";

#[tokio::test(start_paused = true)]
async fn test_four_failures_then_success_waits_fifteen_base_delays() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bview.20140301.0000.gz");
    let mock = Arc::new(MockTransport::new());
    mock.fail_then_serve(FILE_URL, 4, "snapshot");

    let fetcher = FileFetcher::new(mock.clone());
    let started = Instant::now();
    let outcome = fetcher.download(FILE_URL, &path).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcome, DownloadOutcome::Downloaded { bytes: 8 });
    assert_eq!(mock.count(FILE_URL), 5);
    // 1s + 2s + 4s + 8s
    assert!(elapsed >= Duration::from_secs(15), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(16), "elapsed {elapsed:?}");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "snapshot");
}

#[tokio::test(start_paused = true)]
async fn test_backoff_cap_limits_each_delay() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("file.gz");
    let mock = Arc::new(MockTransport::new());
    mock.fail_then_serve(FILE_URL, 4, "ok");

    let policy = RetryPolicy::default().with_max_backoff(Some(Duration::from_secs(2)));
    let fetcher = FileFetcher::new(mock.clone()).with_policy(policy);
    let started = Instant::now();
    fetcher.download(FILE_URL, &path).await.unwrap();
    let elapsed = started.elapsed();

    // 1s + 2s + 2s + 2s
    assert!(elapsed >= Duration::from_secs(7), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(8), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn test_exhausted_attempts_report_status_and_keep_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("file.gz");
    let mock = Arc::new(MockTransport::new());
    mock.serve_status(FILE_URL, StatusCode::INTERNAL_SERVER_ERROR);

    let policy = RetryPolicy::default()
        .with_max_attempts(3)
        .with_base_delay(Duration::from_millis(1));
    let err = FileFetcher::new(mock.clone())
        .with_policy(policy)
        .download(FILE_URL, &path)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetcherError::HttpStatus { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
    assert_eq!(mock.count(FILE_URL), 3);
    // Left behind by default; a rerun will treat it as present
    assert!(path.is_file());
}

#[tokio::test]
async fn test_remove_partial_on_failure() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("file.gz");
    let mock = Arc::new(MockTransport::new());
    mock.serve_status(FILE_URL, StatusCode::NOT_FOUND);

    let policy = RetryPolicy::default()
        .with_max_attempts(2)
        .with_base_delay(Duration::from_millis(1))
        .with_remove_partial_on_failure(true);
    let result = FileFetcher::new(mock)
        .with_policy(policy)
        .download(FILE_URL, &path)
        .await;

    assert!(result.is_err());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_retries_never_append_to_failed_attempt() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("file.gz");
    let mock = Arc::new(MockTransport::new());
    mock.serve_broken_body(FILE_URL, "partial-chunk");

    let policy = RetryPolicy::default()
        .with_max_attempts(3)
        .with_base_delay(Duration::from_millis(1));
    let err = FileFetcher::new(mock.clone())
        .with_policy(policy)
        .download(FILE_URL, &path)
        .await
        .unwrap_err();

    assert!(matches!(err, FetcherError::BodyError(_)));
    assert_eq!(mock.count(FILE_URL), 3);
    assert_eq!(std::fs::read(&path).unwrap(), b"partial-chunk");
}

#[tokio::test]
async fn test_existing_file_is_skipped_without_request() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("file.gz");
    std::fs::write(&path, "already here").unwrap();
    let mock = Arc::new(MockTransport::new());

    let outcome = FileFetcher::new(mock.clone())
        .download(FILE_URL, &path)
        .await
        .unwrap();

    assert_eq!(outcome, DownloadOutcome::Skipped);
    assert!(mock.requests().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "already here");
}

#[tokio::test]
async fn test_executor_reports_transfer_error() {
    let temp = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    mock.serve_index(
        "https://data.ris.ripe.net/rrc00/2014.03",
        &["bview.20140301.0000.gz"],
    );
    mock.serve_status(FILE_URL, StatusCode::BAD_GATEWAY);

    let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", "2014-03-01", "2014-03-01")
        .with_output_root(temp.path());
    let err = DownloadExecutor::with_transport(mock.clone())
        .with_retry_policy(
            RetryPolicy::default()
                .with_max_attempts(2)
                .with_base_delay(Duration::from_millis(1)),
        )
        .run(&request)
        .await
        .unwrap_err();

    match err {
        DownloadError::TransferError { file, date, cause } => {
            assert_eq!(file, "bview.20140301.0000.gz");
            assert_eq!(date.to_string(), "2014-03-01");
            assert!(matches!(cause, FetcherError::HttpStatus { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(mock.count(FILE_URL), 2);
}
