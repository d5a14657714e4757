use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of results requested when the caller doesn't say
pub const DEFAULT_MAX_RESULTS: i64 = 5;

/// Upper bound on `max_results` unless the config file overrides it
pub const DEFAULT_MAX_RESULTS_CEILING: u32 = 20;

/// Content filtering level passed through to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    Strict,
    #[default]
    Moderate,
    Off,
}

impl SafeSearch {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafeSearch::Strict => "strict",
            SafeSearch::Moderate => "moderate",
            SafeSearch::Off => "off",
        }
    }
}

impl fmt::Display for SafeSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafeSearch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SafeSearch::Strict),
            "moderate" => Ok(SafeSearch::Moderate),
            "off" => Ok(SafeSearch::Off),
            _ => Err(Error::invalid_parameter(
                "safesearch",
                format!("Invalid safesearch: '{s}'. Must be one of 'strict', 'moderate' or 'off'."),
            )),
        }
    }
}

/// Validated search input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pub query: String,
    pub max_results: usize,
    pub safesearch: SafeSearch,
}

impl SearchParameters {
    /// Validate raw caller input, reporting the first violation.
    ///
    /// Checks run in order: query, max_results (against `ceiling`), safesearch.
    pub fn validate(
        query: &str,
        max_results: i64,
        safesearch: &str,
        ceiling: u32,
    ) -> Result<Self, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::invalid_parameter(
                "query",
                "Search query is required and must be a non-empty string.",
            ));
        }

        if max_results <= 0 {
            return Err(Error::invalid_parameter(
                "max_results",
                format!("Invalid max_results: {max_results}. Must be a positive integer."),
            ));
        }
        if max_results > i64::from(ceiling) {
            return Err(Error::invalid_parameter(
                "max_results",
                format!("Invalid max_results: {max_results}. Must not exceed {ceiling}."),
            ));
        }

        let safesearch = safesearch.parse::<SafeSearch>()?;

        Ok(Self {
            query: query.to_string(),
            // Bounded by `ceiling` above, so this cannot truncate.
            max_results: max_results as usize,
            safesearch,
        })
    }
}
