//! Month index pages are fetched once per distinct URL

use bgp_archive_downloader::downloader::{DownloadExecutor, DownloadRequest};
use bgp_archive_downloader::fetcher::ListingCache;
use bgp_archive_downloader::source::Source;
use std::sync::Arc;
use std::time::Duration;

use crate::support::mock_transport::MockTransport;

const MARCH: &str = "https://data.ris.ripe.net/rrc00/2014.03";
const FEBRUARY: &str = "https://data.ris.ripe.net/rrc00/2014.02";

fn serve_month(mock: &MockTransport, month_url: &str, prefix: &str, days: u32) {
    let names: Vec<String> = (1..=days)
        .map(|d| format!("bview.{prefix}{d:02}.0000.gz"))
        .collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    mock.serve_index(month_url, &refs);
    for name in &names {
        mock.serve(&format!("{month_url}/{name}"), name.clone());
    }
}

#[tokio::test]
async fn test_whole_month_fetches_index_once() {
    let temp = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new().with_delay(Duration::from_millis(5)));
    serve_month(&mock, MARCH, "201403", 31);

    for concurrency in [1, 4, 31] {
        let out = temp.path().join(format!("k{concurrency}"));
        let before = mock.count(MARCH);
        let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", "2014-03-01", "2014-03-31")
            .with_output_root(&out)
            .with_max_concurrency(concurrency);

        let summary = DownloadExecutor::with_transport(mock.clone())
            .run(&request)
            .await
            .unwrap();

        assert_eq!(summary.days, 31);
        assert_eq!(summary.files_downloaded, 31);
        assert_eq!(
            mock.count(MARCH) - before,
            1,
            "index fetched more than once at concurrency {concurrency}"
        );
    }
}

#[tokio::test]
async fn test_month_boundary_fetches_each_month_once() {
    let temp = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    serve_month(&mock, FEBRUARY, "201402", 28);
    serve_month(&mock, MARCH, "201403", 31);

    let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", "2014-02-27", "2014-03-02")
        .with_output_root(temp.path())
        .with_max_concurrency(4);
    let summary = DownloadExecutor::with_transport(mock.clone())
        .run(&request)
        .await
        .unwrap();

    assert_eq!(summary.days, 4);
    assert_eq!(summary.files_downloaded, 4);
    assert_eq!(mock.count(FEBRUARY), 1);
    assert_eq!(mock.count(MARCH), 1);
    assert!(temp
        .path()
        .join("ripe/bview/rrc00/2014.02/bview.20140228.0000.gz")
        .is_file());
}

#[tokio::test]
async fn test_shared_cache_spans_runs() {
    let temp = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    serve_month(&mock, MARCH, "201403", 31);
    let cache = ListingCache::shared();

    for (start, end) in [("2014-03-01", "2014-03-10"), ("2014-03-11", "2014-03-20")] {
        let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", start, end)
            .with_output_root(temp.path());
        DownloadExecutor::with_transport(mock.clone())
            .with_cache(Arc::clone(&cache))
            .run(&request)
            .await
            .unwrap();
    }

    assert_eq!(mock.count(MARCH), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(MARCH).unwrap().len(), 31);
}

#[tokio::test]
async fn test_failed_listing_is_retried_by_next_day() {
    let temp = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    mock.fail_then_serve(MARCH, 1, bgp_index(&["bview.20140302.0000.gz"]));
    mock.serve(&format!("{MARCH}/bview.20140302.0000.gz"), "x");

    // Sequential days: the first fails, the second lists successfully
    let request = DownloadRequest::new(Source::Ripe, "rrc00", "bview", "2014-03-01", "2014-03-02")
        .with_output_root(temp.path())
        .with_max_concurrency(1);
    let result = DownloadExecutor::with_transport(mock.clone()).run(&request).await;

    assert!(result.is_err());
    assert_eq!(mock.count(MARCH), 2);
    assert!(temp
        .path()
        .join("ripe/bview/rrc00/2014.03/bview.20140302.0000.gz")
        .is_file());
}

fn bgp_index(files: &[&str]) -> String {
    crate::support::mock_transport::index_html(files)
}
