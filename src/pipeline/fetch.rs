//! Page fetch: one HTTP GET with a bounded timeout.
//!
//! No retries, no caching and no robots.txt handling: each call makes one
//! request and maps every failure to [`MapperError::FetchFailed`] or
//! [`MapperError::FetchTimeout`] so the caller can report it and move on.

use crate::config::MapperConfig;
use crate::error::MapperError;
use crate::pipeline::extract::{page_content_from_html, PageContent};
use crate::pipeline::normalize::NormalizedUrl;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, info};

/// Fetch the HTML body at `url`.
///
/// Any content type is accepted; the body is decoded as text using the
/// charset from `Content-Type` (UTF-8 when absent).
pub async fn fetch_html(url: &NormalizedUrl, config: &MapperConfig) -> Result<String, MapperError> {
    info!("Fetching page: {}", url);

    let client = build_client(url, config)?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| map_send_error(url, e, config.fetch_timeout_secs))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MapperError::FetchFailed {
            url: url.to_string(),
            status: Some(status.as_u16()),
            reason: format!("HTTP {status}"),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| map_send_error(url, e, config.fetch_timeout_secs))?;

    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}

/// Fetch `url` and extract its readable text in one step.
pub async fn fetch_content(
    url: &NormalizedUrl,
    config: &MapperConfig,
) -> Result<PageContent, MapperError> {
    let html = fetch_html(url, config).await?;
    page_content_from_html(url, &html, config.min_content_chars)
}

fn build_client(url: &NormalizedUrl, config: &MapperConfig) -> Result<reqwest::Client, MapperError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    let ua = HeaderValue::from_str(&config.user_agent).map_err(|_| {
        MapperError::InvalidConfig(format!(
            "User-Agent {:?} is not a valid HTTP header value",
            config.user_agent
        ))
    })?;
    headers.insert(USER_AGENT, ua);

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| MapperError::FetchFailed {
            url: url.to_string(),
            status: None,
            reason: e.to_string(),
        })
}

fn map_send_error(url: &NormalizedUrl, e: reqwest::Error, timeout_secs: u64) -> MapperError {
    if e.is_timeout() {
        MapperError::FetchTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        MapperError::FetchFailed {
            url: url.to_string(),
            status: e.status().map(|s| s.as_u16()),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::normalize_url;

    #[test]
    fn client_builds_with_default_config() {
        let url = normalize_url("example.com").unwrap();
        assert!(build_client(&url, &MapperConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn invalid_user_agent_is_reported_not_dropped() {
        let config = MapperConfig {
            user_agent: "bad\nagent".into(),
            ..MapperConfig::default()
        };
        let url = normalize_url("http://127.0.0.1:9/").unwrap();
        let err = fetch_html(&url, &config).await.unwrap_err();
        assert!(matches!(err, MapperError::InvalidConfig(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn unparseable_url_is_a_fetch_error() {
        let url = normalize_url("exa mple").unwrap();
        let err = fetch_html(&url, &MapperConfig::default()).await.unwrap_err();
        assert!(err.is_fetch_error(), "got: {err:?}");
    }

    #[tokio::test]
    async fn refused_connection_is_a_fetch_error() {
        // Port 9 (discard) on loopback is closed on any sane test host.
        let url = normalize_url("http://127.0.0.1:9/").unwrap();
        let config = MapperConfig::builder().fetch_timeout_secs(2).build().unwrap();
        let err = fetch_html(&url, &config).await.unwrap_err();
        assert!(err.is_fetch_error(), "got: {err:?}");
    }
}
