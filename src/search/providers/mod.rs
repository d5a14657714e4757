pub mod brave;
pub mod duckduckgo;

pub use brave::BraveSearchProvider;
pub use duckduckgo::DuckDuckGoProvider;

use super::SearchProvider;
use crate::config::settings::{ProviderKind, SearchConfig};
use anyhow::Result;
use std::sync::Arc;

/// Build the provider selected in the config.
pub fn from_config(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>> {
    let provider: Arc<dyn SearchProvider> = match config.provider {
        ProviderKind::DuckDuckGo => Arc::new(DuckDuckGoProvider::new(config)?),
        ProviderKind::Brave => Arc::new(BraveSearchProvider::new(config)?),
    };

    tracing::info!(provider = provider.name(), "search provider initialized");
    Ok(provider)
}
