//! HTTP retrieval of feed documents.
//!
//! This sits outside the parsing engine: it only turns a URL into the
//! decoded document text that [`crate::feed::parse`] consumes.

use std::time::Duration;

use futures::StreamExt;
use reqwest::redirect::Policy;
use thiserror::Error;
use url::Url;

use crate::config::Config;

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 5;

/// Upper bound on the delay between two attempts.
const MAX_BACKOFF_SECS: u64 = 60;

/// Errors that can occur while retrieving a document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Network-level error (DNS, connection, TLS, proxy, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Server kept answering 429 Too Many Requests
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Connection closed before Content-Length bytes arrived
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Builds the HTTP client used for every fetch.
///
/// A configured proxy applies to all schemes; without one, reqwest's
/// environment proxy detection (`HTTP_PROXY`, `HTTPS_PROXY`) stays in
/// effect unless `no_proxy` is set.
pub fn build_client(config: &Config) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder()
        .redirect(redirect_policy())
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.timeout());

    if config.no_proxy {
        builder = builder.no_proxy();
    } else if let Some(proxy) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy.as_str())
            .map_err(|e| FetchError::InvalidUrl(format!("proxy: {e}")))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(format!("Too many redirects (max {MAX_REDIRECTS})"));
        }
        if attempt
            .previous()
            .iter()
            .any(|prev| prev.as_str() == attempt.url().as_str())
        {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(to = %attempt.url(), hop = attempt.previous().len(), "Following redirect");
        attempt.follow()
    })
}

/// Checks that `source` is an absolute http or https URL.
pub fn validate_url(source: &str) -> Result<Url, FetchError> {
    let url = Url::parse(source).map_err(|e| FetchError::InvalidUrl(format!("{source}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FetchError::InvalidUrl(format!(
            "{source}: unsupported scheme {scheme} (only http/https allowed)"
        ))),
    }
}

/// Fetches the document at `url` and returns its body as text.
///
/// - 429 and 5xx responses are retried with exponential backoff (1s, 2s,
///   4s, ...) up to `config.max_retries` times; other 4xx fail immediately
/// - Each attempt is bounded by `config.timeout_secs`
/// - Bodies larger than `config.max_body_bytes` are rejected while streaming
/// - Invalid UTF-8 is replaced rather than rejected
pub async fn fetch_document(
    client: &reqwest::Client,
    url: &str,
    config: &Config,
) -> Result<String, FetchError> {
    let url = validate_url(url)?;
    let mut retry_count = 0;

    let bytes = loop {
        let response = tokio::time::timeout(config.timeout(), client.get(url.clone()).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            if retry_count >= config.max_retries {
                return Err(FetchError::RateLimited(config.max_retries));
            }
            let delay = backoff(retry_count);
            tracing::warn!(
                url = %url,
                retry = retry_count,
                delay_secs = delay.as_secs(),
                "Rate limited, backing off"
            );
            tokio::time::sleep(delay).await;
            retry_count += 1;
            continue;
        }

        if status.is_server_error() {
            if retry_count >= config.max_retries {
                return Err(FetchError::HttpStatus(status.as_u16()));
            }
            let delay = backoff(retry_count);
            tracing::warn!(
                url = %url,
                status = %status,
                retry = retry_count,
                delay_secs = delay.as_secs(),
                "Server error, retrying after delay"
            );
            tokio::time::sleep(delay).await;
            retry_count += 1;
            continue;
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let read = tokio::time::timeout(
            config.timeout(),
            read_limited_bytes(response, config.max_body_bytes),
        )
        .await
        .map_err(|_| FetchError::Timeout)?;

        match read {
            Ok(bytes) => break bytes,
            Err(FetchError::IncompleteResponse { expected, received })
                if retry_count < config.max_retries =>
            {
                let delay = backoff(retry_count);
                tracing::debug!(
                    url = %url,
                    expected = expected,
                    received = received,
                    attempt = retry_count + 1,
                    "Retrying incomplete download"
                );
                tokio::time::sleep(delay).await;
                retry_count += 1;
            }
            Err(e) => return Err(e),
        }
    };

    tracing::debug!(url = %url, bytes = bytes.len(), "Fetched document");
    Ok(decode_body(bytes, &url))
}

fn backoff(retry_count: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(retry_count).min(MAX_BACKOFF_SECS))
}

fn decode_body(bytes: Vec<u8>, url: &Url) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                url = %url,
                valid_up_to = e.utf8_error().valid_up_to(),
                "Document is not valid UTF-8, replacing invalid bytes"
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>T</title><link>http://example.com</link><description>D</description>
</channel></rss>"#;

    fn test_config() -> Config {
        Config {
            max_retries: 1,
            timeout_secs: 5,
            ..Config::default()
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(backoff(0), Duration::from_secs(1));
        assert_eq!(backoff(3), Duration::from_secs(8));
        assert_eq!(backoff(6), Duration::from_secs(MAX_BACKOFF_SECS));
        // 2^64 would overflow u64
        assert_eq!(backoff(64), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(backoff(u32::MAX), Duration::from_secs(MAX_BACKOFF_SECS));
    }

    #[test]
    fn test_validate_url_schemes() {
        assert!(validate_url("https://example.com/feed.xml").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/rss").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com/feed"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("feed.xml"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_decode_body_replaces_invalid_utf8() {
        let url = Url::parse("http://example.com").unwrap();
        let text = decode_body(vec![b'a', 0xff, b'b'], &url);
        assert_eq!(text, "a\u{fffd}b");
    }

    #[test]
    fn test_build_client_rejects_bad_proxy() {
        let config = Config {
            proxy: Some("::not a proxy::".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            build_client(&config),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_success_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(header("user-agent", Config::default().user_agent.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .mount(&mock_server)
            .await;

        let config = test_config();
        let client = build_client(&config).unwrap();
        let body = fetch_document(&client, &format!("{}/feed", mock_server.uri()), &config)
            .await
            .unwrap();
        assert_eq!(body, VALID_RSS);
    }

    #[tokio::test]
    async fn test_fetch_404_fails_without_retry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = test_config();
        let client = build_client(&config).unwrap();
        let result = fetch_document(&client, &mock_server.uri(), &config).await;
        match result {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_retries_then_fails() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2) // Initial request + 1 retry
            .mount(&mock_server)
            .await;

        let config = test_config();
        let client = build_client(&config).unwrap();
        let result = fetch_document(&client, &mock_server.uri(), &config).await;
        match result {
            Err(FetchError::HttpStatus(500)) => {}
            other => panic!("Expected HttpStatus(500), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_503_retry_then_success() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .mount(&mock_server)
            .await;

        let config = test_config();
        let client = build_client(&config).unwrap();
        let body = fetch_document(&client, &mock_server.uri(), &config)
            .await
            .unwrap();
        assert!(body.contains("<title>T</title>"));
    }

    #[tokio::test]
    async fn test_fetch_rate_limited() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let config = Config {
            max_retries: 0,
            ..test_config()
        };
        let client = build_client(&config).unwrap();
        let result = fetch_document(&client, &mock_server.uri(), &config).await;
        assert!(matches!(result, Err(FetchError::RateLimited(0))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2048)))
            .mount(&mock_server)
            .await;

        let config = Config {
            max_body_bytes: 1024,
            ..test_config()
        };
        let client = build_client(&config).unwrap();
        let result = fetch_document(&client, &mock_server.uri(), &config).await;
        assert!(matches!(result, Err(FetchError::ResponseTooLarge)));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let config = Config {
            timeout_secs: 1,
            ..test_config()
        };
        let client = build_client(&config).unwrap();
        let result = fetch_document(&client, &mock_server.uri(), &config).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }
}
