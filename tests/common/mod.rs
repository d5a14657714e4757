//! Common test utilities and fixtures for search and fetch tests
#![allow(dead_code)]

use ddg_search::config::settings::{FetchConfig, SearchConfig};
use ddg_search::fetch::JinaReader;
use ddg_search::search::{RawHit, SearchError, SearchExecutor, SearchParameters, SearchProvider};
use ddg_search::tool::ToolRegistry;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Provider returning canned hits, or failing, and recording its calls
pub struct MockProvider {
    hits: Vec<RawHit>,
    failure: Option<fn() -> SearchError>,
    calls: AtomicUsize,
    last_params: Mutex<Option<SearchParameters>>,
}

impl MockProvider {
    pub fn with_hits(hits: Vec<RawHit>) -> Arc<Self> {
        Arc::new(Self {
            hits,
            failure: None,
            calls: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        })
    }

    pub fn failing(failure: fn() -> SearchError) -> Arc<Self> {
        Arc::new(Self {
            hits: Vec::new(),
            failure: Some(failure),
            calls: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<SearchParameters> {
        self.last_params.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, params: &SearchParameters) -> Result<Vec<RawHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());
        match self.failure {
            Some(failure) => Err(failure()),
            None => Ok(self.hits.clone()),
        }
    }
}

/// Raw hit with every field present
pub fn hit(title: &str, url: &str, snippet: &str) -> RawHit {
    RawHit {
        title: Some(title.to_string()),
        href: Some(url.to_string()),
        body: Some(snippet.to_string()),
    }
}

/// The two-hit page used by most scenarios
pub fn sample_hits() -> Vec<RawHit> {
    vec![
        hit("Rust", "https://www.rust-lang.org/", "A language empowering everyone."),
        hit("Tokio", "https://tokio.rs/", "An asynchronous Rust runtime."),
    ]
}

pub fn executor(provider: Arc<MockProvider>) -> SearchExecutor {
    SearchExecutor::new(provider)
}

/// Search config pointed at a mock server
pub fn search_config(base_url: &str) -> SearchConfig {
    SearchConfig {
        base_url: Some(base_url.to_string()),
        timeout_secs: 5,
        ..SearchConfig::default()
    }
}

/// Jina Reader client pointed at a mock server
pub fn jina_reader(base_url: &str) -> JinaReader {
    JinaReader::new(&FetchConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    })
    .expect("Failed to build Jina Reader client")
}

/// Registry with the default tools over a mock provider
pub fn registry(provider: Arc<MockProvider>) -> ToolRegistry {
    // Nothing listens here; fetch tests use their own mock server.
    ToolRegistry::with_default_tools(executor(provider), jina_reader("http://127.0.0.1:9/"))
}

/// Test fixture for config files
pub struct TestFixture {
    /// Temporary directory that gets cleaned up automatically
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Create a file with given content
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let filepath = self.path().join(name);
        std::fs::write(&filepath, content).expect("Failed to write test file");
        filepath
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creation() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[tokio::test]
    async fn test_mock_provider_records_calls() {
        let provider = MockProvider::with_hits(sample_hits());
        let params = SearchParameters::validate("rust", 5, "off", 20).unwrap();

        let hits = provider.search(&params).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.last_params(), Some(params));
    }
}
