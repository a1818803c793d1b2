//! Common test utilities

use docsieve::config::Config;
use std::path::Path;

/// Configuration pointing at a mock server, tuned for fast tests
pub fn test_config(server_uri: &str, store_dir: &Path) -> Config {
    let mut config = Config::default();
    config.source.index_url = format!("{server_uri}/indices/indcor.htm");
    config.source.base_url = format!("{server_uri}/indices/");
    config.http.requests_per_second = 100;
    config.http.max_retries = 1;
    config.http.retry_base_delay_ms = 10;
    config.http.request_timeout_secs = 10;
    config.store.dir = store_dir.to_path_buf();
    config
}

/// Index page with one row per `(name, description, href)`
#[allow(dead_code)]
pub fn index_html(rows: &[(&str, &str, &str)]) -> String {
    let mut html = String::from(
        "<html><body><table>\n<tr><th>Número</th><th>Sumilla</th></tr>\n",
    );
    for (name, description, href) in rows {
        html.push_str(&format!(
            "<tr><td><a href=\"{href}\">{name}</a></td><td>{description}</td></tr>\n"
        ));
    }
    html.push_str("</table></body></html>");
    html
}
