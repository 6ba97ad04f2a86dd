//! HTML fetcher - the single network boundary of an audit.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::config::AuditConfig;
use crate::error::{AppError, Result};

/// Raw page as retrieved from the network.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub final_url: Url,
    pub html: String,
    pub status_code: u16,
    pub response_time_ms: u64,
    /// Body length in bytes before any truncation: the declared length when the
    /// read stopped early, otherwise the bytes received.
    pub content_length: usize,
}

#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

/// Build the shared HTTP client with the configured timeout and user agent.
pub fn create_client(config: &AuditConfig) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(config.fetch_timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .context("Failed to build HTTP client")
}

/// Reject anything that is not an absolute http(s) URL.
pub fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| AppError::invalid_url(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        scheme => Err(AppError::invalid_url(format!(
            "{}: unsupported scheme '{}'",
            raw, scheme
        ))),
    }
}

pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    max_html_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            timeout: config.fetch_timeout(),
            max_html_bytes: config.max_html_bytes,
        })
    }

    fn map_error(&self, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::FetchTimeout(self.timeout)
        } else {
            AppError::network(error.to_string())
        }
    }
}

#[async_trait]
impl HtmlFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::invalid_url(format!(
                "{}: unsupported scheme '{}'",
                url,
                url.scheme()
            )));
        }

        tracing::info!("[FETCH] Starting: {}", url);
        let start = Instant::now();

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("[FETCH] {} returned HTTP {}", url, status.as_u16());
            return Err(AppError::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().clone();
        let encoding = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(UTF_8, encoding_from_content_type);
        let declared = response.content_length().map(|n| n as usize);

        let mut body = Vec::new();
        let mut received = 0usize;
        let mut truncated = false;
        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_error(e))? {
            received += chunk.len();
            let room = self.max_html_bytes.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if received > self.max_html_bytes {
                truncated = true;
                break;
            }
        }
        let response_time_ms = start.elapsed().as_millis() as u64;

        let content_length = if truncated {
            declared.map_or(received, |n| n.max(received))
        } else {
            received
        };
        if truncated {
            tracing::warn!(
                "[FETCH] {} body exceeds {} bytes, stopped reading after {}",
                url,
                self.max_html_bytes,
                received
            );
        }

        let mut html = decode_body(&body, encoding, !truncated);
        truncate_at_char_boundary(&mut html, self.max_html_bytes);

        tracing::info!(
            "[FETCH] Complete - status: {}, size: {} bytes, time: {}ms",
            status.as_u16(),
            content_length,
            response_time_ms
        );

        Ok(FetchedPage {
            final_url,
            html,
            status_code: status.as_u16(),
            response_time_ms,
            content_length,
        })
    }
}

/// Encoding named by the `charset` parameter of a Content-Type value, UTF-8 otherwise.
fn encoding_from_content_type(content_type: &str) -> &'static Encoding {
    content_type
        .split(';')
        .skip(1)
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"'))
        })
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode to UTF-8. A byte-order mark overrides the declared encoding. When the
/// body is incomplete a multi-byte sequence cut at the end is dropped.
fn decode_body(bytes: &[u8], encoding: &'static Encoding, complete: bool) -> String {
    let mut decoder = encoding.new_decoder();
    let capacity = decoder
        .max_utf8_buffer_length(bytes.len())
        .unwrap_or(bytes.len());
    let mut html = String::with_capacity(capacity);
    let _ = decoder.decode_to_string(bytes, &mut html, complete);
    html
}

fn truncate_at_char_boundary(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(config: AuditConfig) -> HttpFetcher {
        HttpFetcher::new(&config).unwrap()
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/page").is_ok());
        assert!(validate_url(" http://example.com ").is_ok());
        assert!(matches!(validate_url("ftp://example.com"), Err(AppError::InvalidUrl(_))));
        assert!(matches!(validate_url("example.com"), Err(AppError::InvalidUrl(_))));
    }

    #[test]
    fn test_truncate_at_char_boundary() {
        let mut text = "aé".to_string(); // 'é' is two bytes
        truncate_at_char_boundary(&mut text, 2);
        assert_eq!(text, "a");

        let mut text = "short".to_string();
        truncate_at_char_boundary(&mut text, 100);
        assert_eq!(text, "short");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .match_header("user-agent", "test-agent")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><title>Hi</title></html>")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/page", server.url())).unwrap();
        let page = fetcher(AuditConfig::default().with_user_agent("test-agent"))
            .fetch(&url)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.status_code, 200);
        assert_eq!(page.html, "<html><title>Hi</title></html>");
        assert_eq!(page.content_length, page.html.len());
    }

    #[tokio::test]
    async fn test_fetch_truncates_large_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("x".repeat(64))
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap();
        let page = fetcher(AuditConfig::default().with_max_html_bytes(16))
            .fetch(&url)
            .await
            .unwrap();

        assert_eq!(page.html.len(), 16);
        assert_eq!(page.content_length, 64);
    }

    #[test]
    fn test_encoding_from_content_type() {
        assert_eq!(encoding_from_content_type("text/html"), UTF_8);
        assert_eq!(
            encoding_from_content_type("text/html; charset=ISO-8859-1"),
            encoding_rs::WINDOWS_1252
        );
        assert_eq!(
            encoding_from_content_type("text/html; Charset=\"shift_jis\""),
            encoding_rs::SHIFT_JIS
        );
        assert_eq!(encoding_from_content_type("text/html; charset=bogus"), UTF_8);
    }

    #[test]
    fn test_decode_incomplete_body_drops_cut_sequence() {
        let bytes = "café".as_bytes();
        let cut = &bytes[..bytes.len() - 1];
        assert_eq!(decode_body(cut, UTF_8, false), "caf");
        assert_eq!(decode_body(bytes, UTF_8, true), "café");
    }

    #[tokio::test]
    async fn test_fetch_decodes_declared_charset() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/latin1")
            .with_status(200)
            .with_header("content-type", "text/html; charset=iso-8859-1")
            .with_body(b"<title>caf\xe9</title>".as_slice())
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/latin1", server.url())).unwrap();
        let page = fetcher(AuditConfig::default()).fetch(&url).await.unwrap();

        assert_eq!(page.html, "<title>café</title>");
        assert_eq!(page.content_length, 19);
    }

    #[tokio::test]
    async fn test_fetch_stops_reading_at_cap() {
        const CHUNKS: usize = 4096;
        const CHUNK: [u8; 1024] = [b'x'; 1024];

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/huge")
            .with_status(200)
            .with_chunked_body(|w| {
                for _ in 0..CHUNKS {
                    w.write_all(&CHUNK)?;
                }
                Ok(())
            })
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/huge", server.url())).unwrap();
        let page = fetcher(AuditConfig::default().with_max_html_bytes(16))
            .fetch(&url)
            .await
            .unwrap();

        assert_eq!(page.html.len(), 16);
        assert!(page.content_length > 16);
        assert!(page.content_length < CHUNKS * CHUNK.len());
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/missing", server.url())).unwrap();
        let err = fetcher(AuditConfig::default()).fetch(&url).await.unwrap_err();

        assert!(matches!(err, AppError::HttpStatus(404)));
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let err = fetcher(AuditConfig::default().with_fetch_timeout(2))
            .fetch(&url)
            .await
            .unwrap_err();
        assert!(err.is_fetch_failure());
    }
}
