//! Error scenario tests
//!
//! Only the index fetch may stop a run; every other failure stays with the
//! entry it happened to.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docsieve::prelude::*;
use docsieve::utils::error::{AcquireError, FetchError};

use super::fixtures::{mount_document, mount_index, DOC_WITHOUT_TERM, DOC_WITH_TERM};
use crate::common::{index_html, test_config};

#[tokio::test]
async fn test_index_fetch_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indices/indcor.htm"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    let fetcher = DocumentFetcher::new(&config.http).unwrap();

    let result = load_index(&fetcher, &config.source.index_url).await;

    assert!(matches!(result, Err(FetchError::Status(404))));
    let unified: Error = result.unwrap_err().into();
    assert_eq!(unified.category(), ErrorCategory::Network);
}

#[tokio::test]
async fn test_unreachable_host_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    // Nothing listens on port 9 on the loopback interface
    let config = test_config("http://127.0.0.1:9", temp_dir.path());
    let fetcher = DocumentFetcher::new(&config.http).unwrap();

    let result = load_index(&fetcher, &config.source.index_url).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_failed_download_does_not_stop_the_rest() {
    let server = MockServer::start().await;
    mount_index(
        &server,
        index_html(&[
            ("R1", "roto", "docs/broken.pdf"),
            ("R2", "uno", "docs/a.pdf"),
            ("R3", "dos", "docs/b.pdf"),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/indices/docs/broken.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_document(&server, "a.pdf", DOC_WITH_TERM).await;
    mount_document(&server, "b.pdf", DOC_WITHOUT_TERM).await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());
    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();
    let entries = index.entries.prefix(3);

    let manager = AcquisitionManager::new(
        fetcher,
        LinkResolver::new(&config.source.base_url),
        ContentStore::new(&config.store.dir),
        &config.acquisition,
    );
    let downloads = manager.acquire(entries).await.unwrap();

    assert!(matches!(
        downloads.results[0],
        AcquisitionResult::Failed(AcquireError::Transport(FetchError::MaxRetriesExceeded { .. }))
    ));
    assert_eq!(downloads.stats.failed, 1);
    assert_eq!(downloads.stats.stored, 2);
    // Nothing partial left behind for the failed entry
    assert!(!temp_dir.path().join("broken.pdf").exists());

    let engine = SearchEngine::new(
        ContentStore::new(&config.store.dir),
        Arc::new(AutoExtractor::default()),
        2,
    );
    let outcomes = engine.search(entries, "IGV", Some(&downloads)).await;

    assert!(matches!(
        outcomes[0].status,
        SearchStatus::DownloadFailed { .. }
    ));
    assert!(outcomes[1].status.is_match());
    assert_eq!(outcomes[2].status, SearchStatus::NoMatch);
}

#[tokio::test]
async fn test_hung_download_times_out() {
    let server = MockServer::start().await;
    mount_index(
        &server,
        index_html(&[("R1", "lento", "docs/slow.pdf"), ("R2", "uno", "docs/a.pdf")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/indices/docs/slow.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(DOC_WITH_TERM)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    mount_document(&server, "a.pdf", DOC_WITH_TERM).await;

    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&server.uri(), temp_dir.path());
    config.acquisition.document_timeout_secs = 1;
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());
    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();

    let manager = AcquisitionManager::new(
        fetcher,
        LinkResolver::new(&config.source.base_url),
        ContentStore::new(&config.store.dir),
        &config.acquisition,
    );
    let downloads = manager.acquire_prefix(&index.entries, 2).await.unwrap();

    match &downloads.results[0] {
        AcquisitionResult::Failed(e @ AcquireError::Timeout(_)) => {
            assert_eq!(e.to_string(), "download timed out after 1s");
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert!(matches!(downloads.results[1], AcquisitionResult::Stored { .. }));
    assert!(!temp_dir.path().join("slow.pdf").exists());
}

#[tokio::test]
async fn test_missing_file_without_downloads() {
    let temp_dir = TempDir::new().unwrap();
    let store = ContentStore::open(temp_dir.path()).await.unwrap();
    store.write("a.pdf", DOC_WITH_TERM.as_bytes()).await.unwrap();

    let entries = vec![
        Entry::new("R1", "presente", "docs/a.pdf").unwrap(),
        Entry::new("R2", "ausente", "docs/gone.pdf").unwrap(),
    ];
    let engine = SearchEngine::new(store, Arc::new(AutoExtractor::default()), 2);

    let outcomes = engine.search(&entries, "IGV", None).await;

    assert!(outcomes[0].status.is_match());
    assert_eq!(outcomes[1].status, SearchStatus::FileMissing);
}

#[tokio::test]
async fn test_corrupt_pdf_is_an_extraction_failure() {
    let temp_dir = TempDir::new().unwrap();
    let store = ContentStore::open(temp_dir.path()).await.unwrap();
    store
        .write("bad.pdf", b"%PDF-1.7\nthis is not a real document\n%%EOF")
        .await
        .unwrap();
    store.write("a.pdf", DOC_WITH_TERM.as_bytes()).await.unwrap();

    let entries = vec![
        Entry::new("R1", "corrupto", "docs/bad.pdf").unwrap(),
        Entry::new("R2", "texto", "docs/a.pdf").unwrap(),
    ];
    let engine = SearchEngine::new(store, Arc::new(AutoExtractor::default()), 2);

    let outcomes = engine.search(&entries, "IGV", None).await;

    assert!(matches!(
        outcomes[0].status,
        SearchStatus::ExtractFailed { .. }
    ));
    assert!(outcomes[1].status.is_match());
}

#[tokio::test]
async fn test_duplicate_document_names_last_writer_wins() {
    let server = MockServer::start().await;
    mount_index(
        &server,
        index_html(&[
            ("R1", "primero", "docs/one/same.pdf"),
            ("R2", "segundo", "docs/two/same.pdf"),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/indices/docs/one/same.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("uno"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indices/docs/two/same.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("dos"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());
    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();

    assert_eq!(
        EntryList::duplicate_document_names(index.entries.prefix(2)),
        vec!["same.pdf".to_string()]
    );

    let manager = AcquisitionManager::new(
        fetcher,
        LinkResolver::new(&config.source.base_url),
        ContentStore::new(&config.store.dir),
        &config.acquisition,
    );
    let downloads = manager.acquire_prefix(&index.entries, 2).await.unwrap();

    assert_eq!(downloads.stats.stored, 2);
    let stored = std::fs::read_to_string(temp_dir.path().join("same.pdf")).unwrap();
    // Either download may finish last; the file holds one complete payload
    assert!(stored == "uno" || stored == "dos");
}
