use crate::fetch::FetchError;
use std::fmt;

/// Broad classification used when reporting an error to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Service,
    Validation,
    Content,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Service => "service",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Content => "content",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that are surfaced to the caller of a search or fetch.
///
/// Search provider failures never reach this type: the executor absorbs
/// them into a fallback outcome, see [`crate::search::executor`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{message}")]
    InvalidParameter {
        parameter: &'static str,
        message: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl Error {
    pub fn invalid_parameter(parameter: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            parameter,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidParameter { .. } => ErrorCategory::Validation,
            Error::Fetch(e) => e.category(),
        }
    }

    /// Short, stable identifier shown next to the category.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidParameter { .. } => "INVALID_PARAMETER",
            Error::Fetch(e) => e.code(),
        }
    }

    /// Actionable advice for resolving the error, one hint per line.
    pub fn guidance(&self) -> String {
        match self {
            Error::InvalidParameter { parameter, .. } => parameter_guidance(parameter).to_string(),
            Error::Fetch(e) => e.guidance(),
        }
    }

    /// Variant name, used in debug reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidParameter { .. } => "InvalidParameter",
            Error::Fetch(e) => e.kind(),
        }
    }
}

fn parameter_guidance(parameter: &str) -> &'static str {
    match parameter {
        "query" => {
            "Please provide a valid search query:\n\
             \u{2022} The query must be a text string\n\
             \u{2022} The query cannot be empty\n\
             Example: 'python web scraping tutorial'"
        }
        "max_results" => {
            "The max_results parameter must be a positive integer:\n\
             \u{2022} Valid values: 1, 5, 10, 20, etc.\n\
             \u{2022} Default value is 5 if not specified\n\
             \u{2022} Values above the configured ceiling are rejected"
        }
        "safesearch" => {
            "The safesearch parameter accepts three values:\n\
             \u{2022} 'strict' - filter adult content\n\
             \u{2022} 'moderate' (default)\n\
             \u{2022} 'off' - no filtering"
        }
        "output_format" => {
            "The output_format parameter accepts two values:\n\
             \u{2022} 'json' (default) - results as a list of objects\n\
             \u{2022} 'text' - results as LLM-friendly formatted text"
        }
        "format" => {
            "The format parameter accepts two values:\n\
             \u{2022} 'markdown' (default)\n\
             \u{2022} 'json'"
        }
        _ => "Please check the parameter value and try again.",
    }
}
