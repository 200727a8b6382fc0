//! Request validation happens before any network or filesystem activity

use bgp_archive_downloader::downloader::{DownloadError, DownloadExecutor, DownloadRequest};
use bgp_archive_downloader::source::{Source, SourceError};
use std::sync::Arc;

use crate::support::mock_transport::MockTransport;

async fn run(request: DownloadRequest) -> (Result<(), DownloadError>, Arc<MockTransport>) {
    let mock = Arc::new(MockTransport::new());
    let result = DownloadExecutor::with_transport(mock.clone())
        .run(&request)
        .await
        .map(|_| ());
    (result, mock)
}

#[tokio::test]
async fn test_unknown_collector_rejected_without_requests() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("out");
    let request = DownloadRequest::new(Source::Ripe, "zz99", "bview", "2014-03-01", "2014-03-01")
        .with_output_root(&out);

    let (result, mock) = run(request).await;

    assert!(matches!(
        result,
        Err(DownloadError::Source(SourceError::InvalidCollector { ref collector, .. })) if collector == "zz99"
    ));
    assert!(mock.requests().is_empty());
    assert!(!out.exists());
}

#[tokio::test]
async fn test_collector_of_other_archive_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let request = DownloadRequest::new(Source::RouteViews, "rrc00", "rib", "2024-01-01", "2024-01-01")
        .with_output_root(temp.path());

    let (result, mock) = run(request).await;

    assert!(matches!(
        result,
        Err(DownloadError::Source(SourceError::InvalidCollector { .. }))
    ));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_data_type_spelling_is_per_archive() {
    let temp = tempfile::tempdir().unwrap();
    let request = DownloadRequest::new(Source::RouteViews, "chicago", "bview", "2024-01-01", "2024-01-01")
        .with_output_root(temp.path());

    let (result, mock) = run(request).await;

    assert!(matches!(
        result,
        Err(DownloadError::Source(SourceError::InvalidDataType { .. }))
    ));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_reversed_range_rejected_without_requests() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("out");
    let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", "2014-03-05", "2014-03-01")
        .with_output_root(&out);

    let (result, mock) = run(request).await;

    assert!(matches!(result, Err(DownloadError::InvalidDateRange(_))));
    assert!(mock.requests().is_empty());
    assert!(!out.exists());
}

#[tokio::test]
async fn test_malformed_date_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", "01/03/2014", "2014-03-01")
        .with_output_root(temp.path());

    let (result, mock) = run(request).await;

    assert!(matches!(result, Err(DownloadError::InvalidDateRange(_))));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_output_root_that_is_a_file_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let blocker = temp.path().join("occupied");
    std::fs::write(&blocker, "not a directory").unwrap();
    let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", "2014-03-01", "2014-03-01")
        .with_output_root(blocker.join("nested"));

    let (result, mock) = run(request).await;

    assert!(matches!(result, Err(DownloadError::OutputDirError(_))));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_unavailable_index_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", "2014-03-01", "2014-03-01")
        .with_output_root(temp.path());

    // Nothing routed: the index answers 404
    let (result, mock) = run(request).await;

    match result {
        Err(DownloadError::Index { date, source }) => {
            assert_eq!(date.to_string(), "2014-03-01");
            assert!(source.to_string().contains("2014.03"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(mock.requests().len(), 1);
}
