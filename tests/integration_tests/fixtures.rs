//! Test fixtures for integration tests
//!
//! Provides document bodies and helpers for mounting them on a mock server

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Text of the document that mentions the term once
pub const DOC_WITH_TERM: &str = "hola\nmundo IGV\nfin";

/// Text of the document without the term
pub const DOC_WITHOUT_TERM: &str = "sin coincidencia";

/// Document with several matching lines and CRLF line endings
pub const DOC_MANY_MATCHES: &str =
    "Artículo 1.- Tasa del IGV\r\nSe mantiene la tasa\r\nArtículo 2.- Base del IGV\r\n";

/// Single-page PDF whose second text line is "mundo IGV"
pub const PDF_WITH_TERM: &[u8] = include_bytes!("../fixtures/pdf/igv.pdf");

/// Error page some servers return with a 200 status in place of the document
pub const SOFT_NOT_FOUND: &str = "<html><body>SUNAT - Pagina no encontrada</body></html>";

/// Serve the index page at /indices/indcor.htm
pub async fn mount_index(server: &MockServer, html: String) {
    Mock::given(method("GET"))
        .and(path("/indices/indcor.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

/// Serve `body` at /indices/docs/{name}
pub async fn mount_document(server: &MockServer, name: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/indices/docs/{name}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/pdf"),
        )
        .mount(server)
        .await;
}

/// Serve raw bytes at /indices/docs/{name}
pub async fn mount_pdf(server: &MockServer, name: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/indices/docs/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes.to_vec(), "application/pdf"))
        .mount(server)
        .await;
}
