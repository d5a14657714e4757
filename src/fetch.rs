//! Page fetching through the Jina Reader service.
//!
//! Jina Reader (`https://r.jina.ai/<url>`) downloads a page, renders it and
//! returns either markdown or a JSON envelope. This module validates the
//! target URL, builds the reader request, truncates oversized content and
//! classifies failures into [`FetchError`] kinds with user guidance.

use crate::config::settings::FetchConfig;
use crate::error::{Error, ErrorCategory};
use anyhow::Context;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Appended to content cut short by `max_length`
pub const TRUNCATION_MARKER: &str = "... (content truncated)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFormat {
    #[default]
    Markdown,
    Json,
}

impl FromStr for FetchFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" => Ok(FetchFormat::Markdown),
            "json" => Ok(FetchFormat::Json),
            _ => Err(Error::invalid_parameter(
                "format",
                format!("Invalid format: '{s}'. Must be 'markdown' or 'json'."),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub format: FetchFormat,
    /// Character limit on the returned content; `None` or 0 means unlimited
    pub max_length: Option<usize>,
    /// Ask the reader to generate alt text for images
    pub with_images: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutput {
    Markdown(String),
    Json(serde_json::Value),
}

impl FetchOutput {
    pub fn to_text(&self) -> serde_json::Result<String> {
        match self {
            FetchOutput::Markdown(text) => Ok(text.clone()),
            FetchOutput::Json(value) => serde_json::to_string_pretty(value),
        }
    }
}

/// Fetch failures, each mapped to a category, code and guidance
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{message}")]
    InvalidUrl { message: String, guidance: String },

    #[error("Request timed out for URL: {url}. The server took too long to respond.")]
    Timeout { url: String },

    #[error("Could not resolve hostname for URL: {url}. The domain name could not be found.")]
    Dns {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Connection failed for URL: {url}. Unable to establish a connection to the server.")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Rate limited for URL: {url}. Too many requests to the service.")]
    RateLimited {
        url: String,
        retry_after: Option<u64>,
    },

    #[error("Service unavailable for URL: {url}. The server is temporarily unavailable.")]
    ServiceUnavailable { url: String },

    #[error("{message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Failed to decode JSON response for URL: {url}")]
    ContentParsing {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Network error for URL: {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    fn invalid_url(message: impl Into<String>, guidance: impl Into<String>) -> Self {
        FetchError::InvalidUrl {
            message: message.into(),
            guidance: guidance.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::InvalidUrl { .. } => ErrorCategory::Validation,
            FetchError::Timeout { .. }
            | FetchError::Dns { .. }
            | FetchError::Connection { .. }
            | FetchError::Network { .. } => ErrorCategory::Network,
            FetchError::RateLimited { .. }
            | FetchError::ServiceUnavailable { .. }
            | FetchError::Http { .. } => ErrorCategory::Service,
            FetchError::ContentParsing { .. } => ErrorCategory::Content,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "INVALID_URL",
            FetchError::Timeout { .. } => "TIMEOUT",
            FetchError::Dns { .. } => "DNS_ERROR",
            FetchError::Connection { .. } => "CONNECTION_ERROR",
            FetchError::RateLimited { .. } => "RATE_LIMITED",
            FetchError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            FetchError::Http { .. } => "HTTP_ERROR",
            FetchError::ContentParsing { .. } => "CONTENT_PARSING_ERROR",
            FetchError::Network { .. } => "NETWORK_ERROR",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "InvalidUrl",
            FetchError::Timeout { .. } => "Timeout",
            FetchError::Dns { .. } => "Dns",
            FetchError::Connection { .. } => "Connection",
            FetchError::RateLimited { .. } => "RateLimited",
            FetchError::ServiceUnavailable { .. } => "ServiceUnavailable",
            FetchError::Http { .. } => "Http",
            FetchError::ContentParsing { .. } => "ContentParsing",
            FetchError::Network { .. } => "Network",
        }
    }

    pub fn guidance(&self) -> String {
        match self {
            FetchError::InvalidUrl { guidance, .. } => guidance.clone(),
            FetchError::Timeout { .. } => "The server took too long to respond. Try:\n\
                 \u{2022} Waiting a moment and trying again\n\
                 \u{2022} Fetching a smaller page"
                .to_string(),
            FetchError::Dns { .. } => "The domain name could not be resolved:\n\
                 \u{2022} Check the URL for typos\n\
                 \u{2022} Verify the site still exists\n\
                 \u{2022} Check your DNS settings and internet connection"
                .to_string(),
            FetchError::Connection { .. } => "Could not connect to the server:\n\
                 \u{2022} Check your internet connection\n\
                 \u{2022} The server may be down or refusing connections\n\
                 \u{2022} A firewall or proxy may be blocking the request"
                .to_string(),
            FetchError::RateLimited {
                retry_after: Some(secs),
                ..
            } => format!(
                "Too many requests were sent to the reader service.\n\
                 Wait {secs} seconds before trying again."
            ),
            FetchError::RateLimited { .. } => "Too many requests were sent to the reader service.\n\
                 Wait a minute before trying again and reduce the request rate."
                .to_string(),
            FetchError::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please try again in a few minutes."
                    .to_string()
            }
            FetchError::Http { status: 404, .. } => {
                "The URL may be incorrect or the page may have been removed:\n\
                 \u{2022} Verify the URL is correct\n\
                 \u{2022} Check if the page has moved to a new location"
                    .to_string()
            }
            FetchError::Http { status: 403, .. } => {
                "The server refused to grant access:\n\
                 \u{2022} The resource may require authentication\n\
                 \u{2022} The site may restrict automated access\n\
                 Try opening the URL in a browser to verify."
                    .to_string()
            }
            FetchError::Http { status, .. } if (500..600).contains(status) => {
                "The server experienced an error while processing the request:\n\
                 \u{2022} Wait a few moments and try again\n\
                 \u{2022} The issue is on the server side, not your request"
                    .to_string()
            }
            FetchError::Http { .. } => {
                "The server returned an unexpected status. Verify the URL and try again."
                    .to_string()
            }
            FetchError::ContentParsing { .. } => {
                "The response could not be parsed as JSON:\n\
                 \u{2022} The response may have been truncated or corrupted\n\
                 \u{2022} Try format 'markdown' instead of 'json'"
                    .to_string()
            }
            FetchError::Network { .. } => "An unexpected network error occurred:\n\
                 \u{2022} Check your internet connection\n\
                 \u{2022} Verify the URL is correct\n\
                 \u{2022} Try again in a few moments"
                .to_string(),
        }
    }
}

/// Check that `raw` is an absolute http(s) URL with a host.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::invalid_url(
            "URL cannot be empty or contain only whitespace.",
            "Please provide a valid URL, for example https://example.com",
        ));
    }

    if trimmed.contains(' ') {
        return Err(FetchError::invalid_url(
            format!("URL contains spaces: '{trimmed}'"),
            "URLs cannot contain spaces. Replace them with %20 or check that \
             the full URL was copied.",
        ));
    }

    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(FetchError::invalid_url(
                format!("URL is missing the scheme (http:// or https://): '{trimmed}'"),
                format!("URLs must start with http:// or https://. Did you mean:\n  https://{trimmed}"),
            ));
        }
        Err(url::ParseError::EmptyHost) => {
            return Err(missing_domain(trimmed));
        }
        Err(e) => {
            return Err(FetchError::invalid_url(
                format!("Invalid URL '{trimmed}': {e}"),
                "Make sure the URL follows this format: https://domain.com/path",
            ));
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::invalid_url(
            format!(
                "Unsupported URL scheme: '{}'. Only HTTP and HTTPS are supported.",
                url.scheme()
            ),
            "Please use https:// (recommended) or http://. Example: https://example.com",
        ));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(missing_domain(trimmed));
    }

    Ok(url)
}

fn missing_domain(url: &str) -> FetchError {
    FetchError::invalid_url(
        format!("URL is missing the domain name: '{url}'"),
        "The URL must include a domain name after the scheme, e.g. \
         https://example.com/page",
    )
}

/// Cut `content` to `max_length` characters and mark the cut.
pub fn truncate_content(content: &str, max_length: Option<usize>) -> String {
    match max_length {
        Some(max) if max > 0 && content.chars().count() > max => {
            let mut truncated: String = content.chars().take(max).collect();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        _ => content.to_string(),
    }
}

/// Client for the Jina Reader service
#[derive(Clone)]
pub struct JinaReader {
    client: reqwest::Client,
    base_url: String,
}

impl JinaReader {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for Jina Reader")?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    /// Reader endpoint for `target`, percent-encoded with slashes kept.
    fn reader_url(&self, target: &str) -> String {
        let encoded = urlencoding::encode(target).replace("%2F", "/");
        format!("{}{}", self.base_url, encoded)
    }

    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchOutput, FetchError> {
        let url = validate_url(&request.url)?;
        let display_url = request.url.trim().to_string();

        let mut builder = self
            .client
            .get(self.reader_url(url.as_str()))
            .header("x-no-cache", "true");
        if request.format == FetchFormat::Json {
            builder = builder.header(ACCEPT, "application/json");
        }
        if request.with_images {
            builder = builder.header("X-With-Generated-Alt", "true");
        }

        tracing::debug!(url = %display_url, format = ?request.format, "fetching via jina reader");

        let response = builder
            .send()
            .await
            .map_err(|e| classify_request_error(e, &display_url))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            tracing::warn!(url = %display_url, status = %status, "jina reader returned an error status");
            return Err(classify_status(status, retry_after, &display_url));
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_request_error(e, &display_url))?;

        tracing::debug!(url = %display_url, content_len = body.len(), "fetch complete");

        match request.format {
            FetchFormat::Markdown => Ok(FetchOutput::Markdown(truncate_content(
                &body,
                request.max_length,
            ))),
            FetchFormat::Json => {
                let mut value: serde_json::Value =
                    serde_json::from_str(&body).map_err(|source| FetchError::ContentParsing {
                        url: display_url.clone(),
                        source,
                    })?;
                truncate_json_content(&mut value, request.max_length);
                Ok(FetchOutput::Json(value))
            }
        }
    }
}

/// Truncate the `content` string of a reader envelope, at the top level or under `data`.
fn truncate_json_content(value: &mut serde_json::Value, max_length: Option<usize>) {
    for pointer in ["/content", "/data/content"] {
        if let Some(content) = value.pointer_mut(pointer) {
            if let Some(text) = content.as_str() {
                *content = serde_json::Value::String(truncate_content(text, max_length));
            }
        }
    }
}

fn classify_request_error(error: reqwest::Error, url: &str) -> FetchError {
    let url = url.to_string();

    if error.is_timeout() {
        return FetchError::Timeout { url };
    }

    if error.is_connect() {
        if is_dns_failure(&error) {
            return FetchError::Dns { url, source: error };
        }
        return FetchError::Connection { url, source: error };
    }

    FetchError::Network { url, source: error }
}

fn is_dns_failure(error: &reqwest::Error) -> bool {
    const DNS_INDICATORS: &[&str] = &[
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "nodename nor servname provided",
        "temporary failure in name resolution",
        "no such host",
    ];

    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        let text = err.to_string().to_lowercase();
        if DNS_INDICATORS.iter().any(|indicator| text.contains(indicator)) {
            return true;
        }
        source = err.source();
    }
    false
}

fn classify_status(status: StatusCode, retry_after: Option<u64>, url: &str) -> FetchError {
    let url = url.to_string();
    match status.as_u16() {
        429 => FetchError::RateLimited { url, retry_after },
        503 => FetchError::ServiceUnavailable { url },
        404 => FetchError::Http {
            message: format!("Not found for URL: {url}. The requested resource does not exist."),
            url,
            status: 404,
        },
        403 => FetchError::Http {
            message: format!(
                "Access forbidden for URL: {url}. You don't have permission to access this resource."
            ),
            url,
            status: 403,
        },
        code @ 500..=599 => FetchError::Http {
            message: format!(
                "Server error for URL: {url}. The server encountered an internal error."
            ),
            url,
            status: code,
        },
        code => FetchError::Http {
            message: format!("HTTP error for URL: {url}: {code}"),
            url,
            status: code,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invalid_message(raw: &str) -> String {
        match validate_url(raw) {
            Err(FetchError::InvalidUrl { message, .. }) => message,
            other => panic!("expected InvalidUrl for {raw:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_http_and_https() {
        assert_eq!(
            validate_url("  https://example.com/page ").unwrap().as_str(),
            "https://example.com/page"
        );
        assert!(validate_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert!(invalid_message("").contains("cannot be empty"));
        assert!(invalid_message("   ").contains("cannot be empty"));
        assert!(invalid_message("https://exa mple.com").contains("contains spaces"));
        assert!(invalid_message("example.com").contains("missing the scheme"));
        assert!(invalid_message("ftp://example.com").contains("Unsupported URL scheme: 'ftp'"));
        assert!(invalid_message("http://").contains("missing the domain"));
    }

    #[test]
    fn test_missing_scheme_suggests_https() {
        match validate_url("example.com/a") {
            Err(err @ FetchError::InvalidUrl { .. }) => {
                assert!(err.guidance().contains("https://example.com/a"));
                assert_eq!(err.category(), ErrorCategory::Validation);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("hello", None), "hello");
        assert_eq!(truncate_content("hello", Some(0)), "hello");
        assert_eq!(truncate_content("hello", Some(5)), "hello");
        assert_eq!(
            truncate_content("hello world", Some(5)),
            format!("hello{TRUNCATION_MARKER}")
        );
        // Counts characters, not bytes.
        assert_eq!(truncate_content("ééé", Some(2)), format!("éé{TRUNCATION_MARKER}"));
    }

    #[test]
    fn test_truncate_json_content() {
        let mut value = json!({"content": "abcdef", "title": "abcdef"});
        truncate_json_content(&mut value, Some(3));
        assert_eq!(value["content"], format!("abc{TRUNCATION_MARKER}"));
        assert_eq!(value["title"], "abcdef");

        let mut value = json!({"code": 200, "data": {"content": "abcdef"}});
        truncate_json_content(&mut value, Some(2));
        assert_eq!(value["data"]["content"], format!("ab{TRUNCATION_MARKER}"));
    }

    #[test]
    fn test_reader_url_keeps_slashes() {
        let reader = JinaReader::new(&FetchConfig {
            base_url: "https://r.jina.ai".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(
            reader.reader_url("https://example.com/a b?x=1"),
            "https://r.jina.ai/https%3A//example.com/a%20b%3Fx%3D1"
        );
    }

    #[test]
    fn test_classify_status() {
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, Some(30), "https://x.io");
        assert_eq!(err.code(), "RATE_LIMITED");
        assert!(err.guidance().contains("Wait 30 seconds"));

        let err = classify_status(StatusCode::SERVICE_UNAVAILABLE, None, "https://x.io");
        assert_eq!(err.code(), "SERVICE_UNAVAILABLE");

        let err = classify_status(StatusCode::NOT_FOUND, None, "https://x.io");
        assert!(err.to_string().starts_with("Not found for URL: https://x.io"));
        assert!(err.guidance().contains("moved"));

        let err = classify_status(StatusCode::BAD_GATEWAY, None, "https://x.io");
        assert!(err.to_string().starts_with("Server error"));
        assert_eq!(err.category(), ErrorCategory::Service);

        let err = classify_status(StatusCode::IM_A_TEAPOT, None, "https://x.io");
        assert_eq!(err.to_string(), "HTTP error for URL: https://x.io: 418");
    }

    #[test]
    fn test_fetch_format_parsing() {
        assert_eq!("Markdown".parse::<FetchFormat>().unwrap(), FetchFormat::Markdown);
        assert_eq!("json".parse::<FetchFormat>().unwrap(), FetchFormat::Json);
        assert!("html".parse::<FetchFormat>().is_err());
    }
}
