use super::{RawHit, SearchResult};
use crate::error::Error;
use std::str::FromStr;

/// Text rendered in place of an empty result list
pub const NO_RESULTS_MESSAGE: &str = "No results found. This could be due to DuckDuckGo rate \
limiting, the query returning no matches, or network issues. Try rephrasing your search or try \
again in a few minutes.";

/// Transform a raw provider hit into the normalized shape.
pub fn format_search_result(hit: &RawHit, position: usize) -> SearchResult {
    SearchResult {
        title: hit.title.clone().unwrap_or_default(),
        url: hit.href.clone().unwrap_or_default(),
        snippet: hit.body.clone().unwrap_or_default(),
        position,
    }
}

/// Requested presentation of a result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            _ => Err(Error::invalid_parameter(
                "output_format",
                format!("Invalid output_format: '{s}'. Must be 'json' or 'text'."),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Structured(Vec<SearchResult>),
    Text(String),
}

impl Rendered {
    /// Encode for a caller that only speaks text: pretty JSON or the text block.
    pub fn to_text(&self) -> serde_json::Result<String> {
        match self {
            // serde_json never escapes non-ASCII characters.
            Rendered::Structured(results) => serde_json::to_string_pretty(results),
            Rendered::Text(text) => Ok(text.clone()),
        }
    }
}

pub fn render(results: Vec<SearchResult>, format: OutputFormat) -> Rendered {
    match format {
        OutputFormat::Json => Rendered::Structured(results),
        OutputFormat::Text => Rendered::Text(render_text(&results)),
    }
}

fn render_text(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let mut output = format!("Found {} search results:\n\n", results.len());
    for result in results {
        output.push_str(&format!(
            "{}. {}\n   URL: {}\n   Summary: {}\n\n",
            result.position, result.title, result.url, result.snippet
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(title: &str, position: usize) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: format!("https://{}.example", title.to_lowercase()),
            snippet: format!("about {title}"),
            position,
        }
    }

    #[test]
    fn test_format_complete_hit() {
        let hit = RawHit {
            title: Some("A".into()),
            href: Some("http://a".into()),
            body: Some("snippet-a".into()),
        };
        let formatted = format_search_result(&hit, 1);
        assert_eq!(
            serde_json::to_value(&formatted).unwrap(),
            json!({"title": "A", "url": "http://a", "snippet": "snippet-a", "position": 1})
        );
    }

    #[test]
    fn test_format_tolerates_missing_fields() {
        let hit: RawHit = serde_json::from_value(json!({"href": "http://x"})).unwrap();
        assert_eq!(
            serde_json::to_value(format_search_result(&hit, 1)).unwrap(),
            json!({"title": "", "url": "http://x", "snippet": "", "position": 1})
        );

        let empty = format_search_result(&RawHit::default(), 7);
        assert_eq!(empty.title, "");
        assert_eq!(empty.url, "");
        assert_eq!(empty.snippet, "");
        assert_eq!(empty.position, 7);
    }

    #[test]
    fn test_raw_hit_accepts_alternate_keys() {
        let hit: RawHit =
            serde_json::from_value(json!({"title": "T", "url": "http://u", "snippet": "s"}))
                .unwrap();
        assert_eq!(hit.href.as_deref(), Some("http://u"));
        assert_eq!(hit.body.as_deref(), Some("s"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_structured_keeps_records() {
        let results = vec![result("A", 1), result("B", 2)];
        assert_eq!(
            render(results.clone(), OutputFormat::Json),
            Rendered::Structured(results)
        );
        assert_eq!(
            render(Vec::new(), OutputFormat::Json).to_text().unwrap(),
            "[]"
        );
    }

    #[test]
    fn test_render_text_empty_uses_message() {
        let Rendered::Text(text) = render(Vec::new(), OutputFormat::Text) else {
            panic!("expected text rendering");
        };
        assert_eq!(text, NO_RESULTS_MESSAGE);
        assert!(!text.is_empty());
    }

    #[test]
    fn test_render_text_numbers_by_position() {
        // Filtered upstream: positions 2 and 5 remain.
        let results = vec![result("B", 2), result("E", 5)];
        let Rendered::Text(text) = render(results, OutputFormat::Text) else {
            panic!("expected text rendering");
        };
        assert!(text.starts_with("Found 2 search results:"));
        assert!(text.contains("2. B\n   URL: https://b.example\n   Summary: about B"));
        assert!(text.contains("5. E\n"));
        assert!(!text.contains("1. "));
    }

    #[test]
    fn test_structured_json_preserves_non_ascii() {
        let results = vec![SearchResult {
            title: "Café Zürich".into(),
            url: "https://例え.jp".into(),
            snippet: "日本語".into(),
            position: 1,
        }];
        let text = render(results, OutputFormat::Json).to_text().unwrap();
        assert!(text.contains("Café Zürich"));
        assert!(text.contains("日本語"));
        assert!(text.contains("\"position\": 1"));
    }
}
