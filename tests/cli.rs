//! CLI handlers: stdout/stderr contents and exit codes

mod common;

use clap::Parser;
use common::{executor, jina_reader, sample_hits, MockProvider, TestFixture};
use ddg_search::cli::{handle_fetch, handle_search, Cli, Command};
use ddg_search::config;
use ddg_search::search::{SearchError, NO_RESULTS_MESSAGE};
use std::process::ExitCode;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse(args: &[&str]) -> Command {
    let mut argv = vec!["ddg-search"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

async fn run_search(provider: std::sync::Arc<MockProvider>, args: &[&str]) -> (ExitCode, String, String) {
    let Command::Search(args) = parse(args) else {
        panic!("expected search command");
    };
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = handle_search(&executor(provider), &args, false, &mut out, &mut err)
        .await
        .unwrap();
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[tokio::test]
async fn test_search_prints_json() {
    let provider = MockProvider::with_hits(sample_hits());
    let (code, out, err) = run_search(provider.clone(), &["search", "rust", "lang"]).await;

    assert_eq!(code, ExitCode::SUCCESS);
    assert!(err.is_empty());
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert!(out.contains("\n  {\n"), "output should be pretty-printed");
    assert_eq!(provider.last_params().unwrap().query, "rust lang");
}

#[tokio::test]
async fn test_search_text_mode() {
    let (code, out, _) = run_search(
        MockProvider::with_hits(sample_hits()),
        &["search", "rust", "--output-format", "text", "--max-results", "1"],
    )
    .await;

    assert_eq!(code, ExitCode::SUCCESS);
    assert!(out.starts_with("Found 1 search results:\n\n1. Rust\n"));
}

#[tokio::test]
async fn test_zero_results_still_succeeds() {
    let (code, out, _) = run_search(
        MockProvider::failing(|| SearchError::RateLimitExceeded),
        &["search", "rust", "--output-format", "text"],
    )
    .await;

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(out.trim_end(), NO_RESULTS_MESSAGE);
}

#[tokio::test]
async fn test_invalid_parameter_exits_nonzero() {
    let provider = MockProvider::with_hits(sample_hits());
    let (code, out, err) =
        run_search(provider.clone(), &["search", "rust", "--max-results", "-1"]).await;

    assert_eq!(code, ExitCode::FAILURE);
    assert!(out.is_empty());
    assert!(err.starts_with("Error [VALIDATION:INVALID_PARAMETER]"));
    assert!(err.contains("  Invalid max_results: -1. Must be a positive integer."));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_fetch_prints_markdown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Page"))
        .mount(&server)
        .await;

    let Command::Fetch(args) = parse(&["fetch", "https://example.com/"]) else {
        panic!("expected fetch command");
    };
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = handle_fetch(&jina_reader(&server.uri()), &args, false, &mut out, &mut err)
        .await
        .unwrap();

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(String::from_utf8(out).unwrap(), "# Page\n");
}

#[tokio::test]
async fn test_fetch_error_exits_nonzero() {
    let Command::Fetch(args) = parse(&["fetch", "ftp://example.com/file"]) else {
        panic!("expected fetch command");
    };
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = handle_fetch(&jina_reader("http://127.0.0.1:9/"), &args, true, &mut out, &mut err)
        .await
        .unwrap();

    assert_eq!(code, ExitCode::FAILURE);
    let err = String::from_utf8(err).unwrap();
    assert!(err.starts_with("Error [VALIDATION:INVALID_URL]"));
    assert!(err.contains("Debug Information:\n  Error type: InvalidUrl"));
}

#[test]
fn test_config_file_flag_is_loaded() {
    let fixture = TestFixture::new();
    let path = fixture.create_file(
        "config.toml",
        "debug = true\n\n[search]\nmax_results_ceiling = 50\non_failure = \"placeholder\"\n",
    );

    let config = config::load(Some(&path)).unwrap();
    assert!(config.debug);
    assert_eq!(config.search.max_results_ceiling, 50);

    let missing = fixture.path().join("missing.toml");
    let err = config::load(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
