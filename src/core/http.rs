use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

use crate::core::config::DownloaderConfig;

/// Build the shared HTTP client used by every fetch in the pipeline.
///
/// `Accept-Encoding: identity` keeps digest-addressed payloads byte-exact.
/// Timeouts are finite; an attempt that exceeds them counts as that URL's
/// failure.
pub fn build_http_client(config: &DownloaderConfig) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(default_headers)
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .build()
}
