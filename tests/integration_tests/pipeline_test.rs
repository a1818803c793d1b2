//! Pipeline integration tests
//!
//! Tests the complete index → download → search → report pipeline

use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docsieve::prelude::*;

use super::fixtures::{
    mount_document, mount_index, mount_pdf, DOC_MANY_MATCHES, DOC_WITHOUT_TERM, DOC_WITH_TERM,
    PDF_WITH_TERM, SOFT_NOT_FOUND,
};
use crate::common::{index_html, test_config};

fn two_entry_index() -> String {
    index_html(&[
        ("R1", "Primera resolución", "docs/a.pdf"),
        ("R2", "Segunda resolución", "docs/b.pdf"),
    ])
}

fn manager_for(config: &Config, fetcher: Arc<DocumentFetcher>) -> AcquisitionManager {
    AcquisitionManager::new(
        fetcher,
        LinkResolver::new(&config.source.base_url),
        ContentStore::new(&config.store.dir),
        &config.acquisition,
    )
}

/// Engine that also reads the plain-text bodies the mock server serves
fn engine_for(config: &Config) -> SearchEngine {
    SearchEngine::new(
        ContentStore::new(&config.store.dir),
        ExtractorKind::Auto.build(),
        config.search.max_concurrent_extractions,
    )
}

// ============================================================================
// Complete Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_pipeline_reports_only_matching_documents() {
    let server = MockServer::start().await;
    mount_index(&server, two_entry_index()).await;
    mount_document(&server, "a.pdf", DOC_WITH_TERM).await;
    mount_document(&server, "b.pdf", DOC_WITHOUT_TERM).await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());

    // Step 1: Index
    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();
    assert_eq!(index.entries.len(), 2);

    // Step 2: Downloads
    let count = clamp_count(
        parse_count("2", config.search.count_policy).unwrap(),
        index.entries.len(),
    );
    let entries = index.entries.prefix(count);
    let downloads = manager_for(&config, fetcher).acquire(entries).await.unwrap();
    assert_eq!(downloads.stats.stored, 2);
    assert!(temp_dir.path().join("a.pdf").is_file());
    assert!(temp_dir.path().join("b.pdf").is_file());

    // Step 3: Search
    let outcomes = engine_for(&config)
        .search(entries, "IGV", Some(&downloads))
        .await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        outcomes[0].status,
        SearchStatus::Matched {
            lines: vec!["mundo IGV".to_string()]
        }
    );
    assert_eq!(outcomes[1].status, SearchStatus::NoMatch);

    // Step 4: Report
    let text = TextReport::new().unwrap().render(&outcomes, "IGV").unwrap();
    assert!(text.contains("Nombre: R1"));
    assert!(text.contains("Párrafo(s): mundo IGV"));
    assert!(text.contains("Palabra de búsqueda: IGV"));
    assert!(!text.contains("R2"));
}

#[tokio::test]
async fn test_pipeline_with_default_pdf_extractor() {
    let server = MockServer::start().await;
    mount_index(&server, two_entry_index()).await;
    mount_pdf(&server, "a.pdf", PDF_WITH_TERM).await;
    // A 200 error page saved under a .pdf name
    mount_document(&server, "b.pdf", SOFT_NOT_FOUND).await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    assert_eq!(config.search.extractor, ExtractorKind::Pdf);
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());

    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();
    let entries = index.entries.prefix(2);
    let downloads = manager_for(&config, fetcher).acquire(entries).await.unwrap();
    assert_eq!(downloads.stats.stored, 2);

    let engine = SearchEngine::new(
        ContentStore::new(&config.store.dir),
        config.search.extractor.build(),
        config.search.max_concurrent_extractions,
    );

    let outcomes = engine.search(entries, "IGV", Some(&downloads)).await;
    match &outcomes[0].status {
        SearchStatus::Matched { lines } => {
            assert_eq!(lines.len(), 1);
            assert!(lines[0].contains("mundo IGV"), "unexpected line: {:?}", lines[0]);
        }
        other => panic!("expected a match in the PDF, got {other:?}"),
    }
    assert!(matches!(
        outcomes[1].status,
        SearchStatus::ExtractFailed { .. }
    ));

    // The error page mentions SUNAT but is never read as text
    let outcomes = engine.search(entries, "SUNAT", None).await;
    assert_eq!(outcomes[0].status, SearchStatus::NoMatch);
    assert!(matches!(
        outcomes[1].status,
        SearchStatus::ExtractFailed { .. }
    ));

    let outcomes = engine.search(entries, "IGV", None).await;
    let text = TextReport::new().unwrap().render(&outcomes, "IGV").unwrap();
    assert!(text.contains("Nombre: R1"));
    assert!(!text.contains("R2"));
}

#[tokio::test]
async fn test_pipeline_downloads_only_the_prefix() {
    let server = MockServer::start().await;
    mount_index(
        &server,
        index_html(&[
            ("R1", "uno", "docs/a.pdf"),
            ("R2", "dos", "docs/b.pdf"),
            ("R3", "tres", "docs/c.pdf"),
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/indices/docs/[ab]\.pdf$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DOC_WITH_TERM))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/indices/docs/c\.pdf$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DOC_WITH_TERM))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());

    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();
    let downloads = manager_for(&config, fetcher)
        .acquire_prefix(&index.entries, 2)
        .await
        .unwrap();

    assert_eq!(downloads.results.len(), 2);
    assert!(!temp_dir.path().join("c.pdf").exists());
}

#[tokio::test]
async fn test_pipeline_count_larger_than_index() {
    let server = MockServer::start().await;
    mount_index(&server, two_entry_index()).await;
    mount_document(&server, "a.pdf", DOC_WITH_TERM).await;
    mount_document(&server, "b.pdf", DOC_WITHOUT_TERM).await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());

    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();
    let count = clamp_count(parse_count("500", CountPolicy::Strict).unwrap(), index.entries.len());
    assert_eq!(count, 2);

    let downloads = manager_for(&config, fetcher)
        .acquire_prefix(&index.entries, count)
        .await
        .unwrap();
    assert_eq!(downloads.stats.attempted, 2);
}

#[tokio::test]
async fn test_non_numeric_count_processes_nothing() {
    let server = MockServer::start().await;
    mount_index(&server, two_entry_index()).await;

    // No document may be requested
    Mock::given(method("GET"))
        .and(path_regex(r"^/indices/docs/.*$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());
    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();

    // Strict: rejected with a message
    let err = parse_count("abc", CountPolicy::Strict).unwrap_err();
    assert!(err.to_string().contains("abc"));

    // Lenient: zero documents, zero outcomes
    let count = clamp_count(
        parse_count("abc", CountPolicy::Lenient).unwrap(),
        index.entries.len(),
    );
    let entries = index.entries.prefix(count);
    let downloads = manager_for(&config, fetcher).acquire(entries).await.unwrap();
    let outcomes = engine_for(&config)
        .search(entries, "IGV", Some(&downloads))
        .await;

    assert!(downloads.results.is_empty());
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn test_pipeline_json_report() {
    let server = MockServer::start().await;
    mount_index(
        &server,
        index_html(&[
            ("R1", "uno", "docs/a.pdf"),
            ("R2", "dos", "docs/b.pdf"),
            ("R3", "tres", "docs/missing.pdf"),
        ]),
    )
    .await;
    mount_document(&server, "a.pdf", DOC_MANY_MATCHES).await;
    mount_document(&server, "b.pdf", DOC_WITHOUT_TERM).await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());

    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();
    let entries = index.entries.prefix(3);
    let downloads = manager_for(&config, fetcher).acquire(entries).await.unwrap();
    let outcomes = engine_for(&config)
        .search(entries, "IGV", Some(&downloads))
        .await;

    let json = JsonReport::new("IGV", &outcomes).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["summary"]["matched"], 1);
    assert_eq!(value["summary"]["no_match"], 1);
    assert_eq!(value["summary"]["download_failed"], 1);
    assert_eq!(value["outcomes"][0]["lines"][0], "Artículo 1.- Tasa del IGV");
    assert_eq!(value["outcomes"][0]["lines"][1], "Artículo 2.- Base del IGV");
    assert_eq!(value["outcomes"][2]["status"], "download_failed");
}

#[tokio::test]
async fn test_rerun_offline_uses_stored_documents() {
    let server = MockServer::start().await;
    mount_index(&server, two_entry_index()).await;
    mount_document(&server, "a.pdf", DOC_WITH_TERM).await;
    mount_document(&server, "b.pdf", DOC_WITHOUT_TERM).await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), temp_dir.path());
    let fetcher = Arc::new(DocumentFetcher::new(&config.http).unwrap());
    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .unwrap();
    let entries = index.entries.prefix(2);
    manager_for(&config, fetcher).acquire(entries).await.unwrap();

    // Second run searches a different term without downloading
    let outcomes = engine_for(&config).search(entries, "coincidencia", None).await;

    assert_eq!(outcomes[0].status, SearchStatus::NoMatch);
    assert_eq!(
        outcomes[1].status,
        SearchStatus::Matched {
            lines: vec!["sin coincidencia".to_string()]
        }
    );
}
