use crate::config::settings::SearchConfig;
use crate::search::{RawHit, SafeSearch, SearchError, SearchParameters, SearchProvider};
use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com/html/";

// The HTML endpoint serves a challenge page to clients that don't look like a browser.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// DuckDuckGo provider
///
/// Scrapes the JavaScript-free HTML endpoint, so no API key is needed.
/// Only the first result page is read.
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    base_url: String,
    region: String,
}

impl DuckDuckGoProvider {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for DuckDuckGo")?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            region: config.region.clone(),
        })
    }

    /// Value of the `kp` query parameter
    fn safesearch_code(level: SafeSearch) -> &'static str {
        match level {
            SafeSearch::Strict => "1",
            SafeSearch::Moderate => "-1",
            SafeSearch::Off => "-2",
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, params: &SearchParameters) -> Result<Vec<RawHit>, SearchError> {
        tracing::debug!(
            query = %params.query,
            region = %self.region,
            safesearch = %params.safesearch,
            "performing duckduckgo search"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", params.query.as_str()),
                ("kl", self.region.as_str()),
                ("kp", Self::safesearch_code(params.safesearch)),
            ])
            .send()
            .await?;

        let status = response.status();
        // A throttled client gets 202 with a challenge page instead of results.
        match status.as_u16() {
            202 | 429 => return Err(SearchError::RateLimitExceeded),
            503 => return Err(SearchError::ServiceUnavailable(503)),
            _ if !status.is_success() => {
                let error_text = response.text().await.unwrap_or_default();
                tracing::warn!(status = %status, "duckduckgo returned an error status");
                return Err(SearchError::ApiError(format!(
                    "HTTP {}: {}",
                    status,
                    error_text.chars().take(200).collect::<String>()
                )));
            }
            _ => {}
        }

        let html = response.text().await?;
        let hits = parse_results(&html, params.max_results)?;

        tracing::debug!(
            query = %params.query,
            result_count = hits.len(),
            "duckduckgo search completed"
        );
        Ok(hits)
    }
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::ParseError(format!("selector {css}: {e}")))
}

/// Extract organic hits from a result page, in page order.
pub(crate) fn parse_results(html: &str, max_results: usize) -> Result<Vec<RawHit>, SearchError> {
    let document = Html::parse_document(html);

    let challenge = selector("div.anomaly-modal__modal, form#challenge-form")?;
    if document.select(&challenge).next().is_some() {
        return Err(SearchError::RateLimitExceeded);
    }

    let result_sel = selector("div.result")?;
    let title_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut hits = Vec::new();
    for element in document.select(&result_sel) {
        let skip = element
            .value()
            .classes()
            .any(|class| class == "result--ad" || class == "result--no-result");
        if skip {
            continue;
        }

        let link = element.select(&title_sel).next();
        let hit = RawHit {
            title: link.and_then(element_text),
            href: link
                .and_then(|a| a.value().attr("href"))
                .map(resolve_href),
            body: element.select(&snippet_sel).next().and_then(element_text),
        };

        if hit == RawHit::default() {
            continue;
        }
        hits.push(hit);

        if hits.len() >= max_results {
            break;
        }
    }

    Ok(hits)
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

/// Unwrap DuckDuckGo's `/l/?uddg=<target>` redirect links.
fn resolve_href(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    if let Ok(url) = reqwest::Url::parse(&absolute) {
        if url.path().starts_with("/l/") {
            if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
                return target.into_owned();
            }
        }
    }

    absolute
}
