use crate::search::params::DEFAULT_MAX_RESULTS_CEILING;
use crate::search::FallbackPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug-level logging
    #[serde(default)]
    pub debug: bool,

    /// Write logs to this file (or directory) instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    /// How log files are rotated when `debug_log_path` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// Number of rotated log files to keep (0 keeps everything)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Config {
    /// Apply SEARCH_PROVIDER and BRAVE_API_KEY overrides.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("SEARCH_PROVIDER") {
            match name.parse::<ProviderKind>() {
                Ok(provider) => self.search.provider = provider,
                Err(_) => tracing::warn!(
                    provider = %name,
                    "unknown search provider in SEARCH_PROVIDER, keeping {}",
                    self.search.provider.as_str()
                ),
            }
        }

        if let Some(key) = lookup("BRAVE_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.search.brave_api_key = Some(key.trim().to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// Append to a single file
    None,
    /// One file per day
    Daily,
    /// One file per process
    Session,
}

/// Supported search providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    DuckDuckGo,
    Brave,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::DuckDuckGo => "duckduckgo",
            ProviderKind::Brave => "brave",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(ProviderKind::DuckDuckGo),
            "brave" => Ok(ProviderKind::Brave),
            other => Err(format!("unknown search provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    /// Largest accepted `max_results`
    #[serde(default = "default_max_results_ceiling")]
    pub max_results_ceiling: u32,

    /// DuckDuckGo region code (`wt-wt` means no region)
    #[serde(default = "default_region")]
    pub region: String,

    /// HTTP timeout for one provider call
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Outcome returned when the provider fails
    #[serde(default)]
    pub on_failure: FallbackPolicy,

    /// Override the provider endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brave_api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            max_results_ceiling: default_max_results_ceiling(),
            region: default_region(),
            timeout_secs: default_search_timeout(),
            on_failure: FallbackPolicy::default(),
            base_url: None,
            brave_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Jina Reader endpoint; the target URL is appended to it
    #[serde(default = "default_fetch_base_url")]
    pub base_url: String,

    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_fetch_base_url(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_max_results_ceiling() -> u32 {
    DEFAULT_MAX_RESULTS_CEILING
}

fn default_region() -> String {
    "wt-wt".to_string()
}

fn default_search_timeout() -> u64 {
    15
}

fn default_fetch_base_url() -> String {
    "https://r.jina.ai/".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}
