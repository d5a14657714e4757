//! Command-line entry point: `serve`, `search`, `fetch` and `version`.

use crate::config::{self, Config};
use crate::error::{Error, ErrorCategory};
use crate::fetch::{FetchFormat, FetchRequest, JinaReader};
use crate::search::executor::SearchRequest;
use crate::search::params::DEFAULT_MAX_RESULTS;
use crate::search::providers;
use crate::search::SearchExecutor;
use crate::tool::ToolRegistry;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "ddg-search",
    version,
    about = "DuckDuckGo search and page fetching, from the shell or as an MCP server"
)]
pub struct Cli {
    /// Enable debug logging and detailed error reports
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the MCP server over stdio
    Serve,
    /// Search DuckDuckGo directly
    Search(SearchArgs),
    /// Fetch a URL as markdown or JSON through Jina Reader
    Fetch(FetchArgs),
    /// Show version information
    Version,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search query
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Maximum number of results to return
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS, allow_negative_numbers = true)]
    pub max_results: i64,

    /// Safe search setting: strict, moderate or off
    #[arg(long, default_value = "moderate")]
    pub safesearch: String,

    /// 'json' for structured data, 'text' for an LLM-friendly list
    #[arg(long, default_value = "json")]
    pub output_format: String,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// URL to fetch content from
    pub url: String,

    /// Output format: markdown or json
    #[arg(long, default_value = "markdown")]
    pub format: String,

    /// Maximum length of content to return
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Generate alt text for images
    #[arg(long)]
    pub with_images: bool,
}

pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = crate::logging::with_bootstrap(cli.debug, || config::load(cli.config.as_deref()));
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_unexpected(&e, cli.debug));
            return Ok(ExitCode::FAILURE);
        }
    };
    let _log_guard = crate::logging::init(&config, cli.debug)?;
    let debug = cli.debug || config.debug;

    // Unlocked handles: the log writer thread shares stderr.
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let code = match cli.command {
        Command::Version => handle_version(&config, debug, &mut stdout)?,
        Command::Search(args) => {
            let executor = build_executor(&config)?;
            handle_search(&executor, &args, debug, &mut stdout, &mut stderr).await?
        }
        Command::Fetch(args) => {
            let reader = JinaReader::new(&config.fetch)?;
            handle_fetch(&reader, &args, debug, &mut stdout, &mut stderr).await?
        }
        Command::Serve => {
            let registry = ToolRegistry::with_default_tools(
                build_executor(&config)?,
                JinaReader::new(&config.fetch)?,
            );
            match crate::server::serve_stdio(registry).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "MCP server failed");
                    writeln!(stderr, "{}", format_unexpected(&e, debug))?;
                    ExitCode::FAILURE
                }
            }
        }
    };

    Ok(code)
}

fn build_executor(config: &Config) -> Result<SearchExecutor> {
    let provider = providers::from_config(&config.search)?;
    Ok(SearchExecutor::new(provider)
        .with_fallback(config.search.on_failure)
        .with_max_results_ceiling(config.search.max_results_ceiling))
}

pub fn handle_version(config: &Config, debug: bool, out: &mut impl Write) -> io::Result<ExitCode> {
    writeln!(out, "ddg-search v{}", env!("CARGO_PKG_VERSION"))?;
    if debug {
        writeln!(out, "Platform: {}/{}", std::env::consts::OS, std::env::consts::ARCH)?;
        writeln!(out, "Search provider: {}", config.search.provider.as_str())?;
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn handle_search(
    executor: &SearchExecutor,
    args: &SearchArgs,
    debug: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<ExitCode> {
    let query = args.query.join(" ");
    let request = SearchRequest {
        query: &query,
        max_results: args.max_results,
        safesearch: &args.safesearch,
        output_format: &args.output_format,
    };

    match executor.search_and_render(&request).await {
        Ok(rendered) => {
            let text = rendered.to_text().map_err(io::Error::other)?;
            writeln!(out, "{text}")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!(kind = e.kind(), error = %e, "search rejected");
            writeln!(err, "{}", format_error(&e, debug))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn handle_fetch(
    reader: &JinaReader,
    args: &FetchArgs,
    debug: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<ExitCode> {
    let result = match args.format.parse::<FetchFormat>() {
        Ok(format) => reader
            .fetch(&FetchRequest {
                url: args.url.clone(),
                format,
                max_length: args.max_length,
                with_images: args.with_images,
            })
            .await
            .map_err(Error::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => {
            let text = output.to_text().map_err(io::Error::other)?;
            writeln!(out, "{text}")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!(kind = e.kind(), error = %e, "fetch failed");
            writeln!(err, "{}", format_error(&e, debug))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Render an error for the terminal: category and code, the message, then
/// guidance. Debug mode appends the variant and the source chain.
pub fn format_error(error: &Error, debug: bool) -> String {
    let mut lines = vec![
        format!(
            "Error [{}:{}]",
            error.category().as_str().to_uppercase(),
            error.code()
        ),
        String::new(),
        format!("  {error}"),
        String::new(),
        "What to do:".to_string(),
    ];
    lines.extend(error.guidance().lines().map(|line| format!("  {line}")));

    if debug {
        lines.push(String::new());
        lines.push("Debug Information:".to_string());
        lines.push(format!("  Error type: {}", error.kind()));
        lines.push(format!("  Error code: {}", error.code()));
        lines.push(format!("  Category: {}", error.category()));

        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            lines.push(format!("  Caused by: {cause}"));
            source = cause.source();
        }
    }

    lines.join("\n")
}

/// Same layout for failures outside the search/fetch error model.
pub fn format_unexpected(error: &anyhow::Error, debug: bool) -> String {
    let category = ErrorCategory::Unknown;
    let mut lines = vec![
        format!("Error [{}]", category.as_str().to_uppercase()),
        String::new(),
        format!("  {error}"),
        String::new(),
    ];

    if debug {
        lines.push("Debug Information:".to_string());
        lines.push(format!("  Category: {category}"));
        lines.extend(error.chain().skip(1).map(|cause| format!("  Caused by: {cause}")));
    } else {
        lines.push("What to do:".to_string());
        lines.push("  Please try again. If the problem persists, run with --debug".to_string());
        lines.push("  for more details, or report this issue.".to_string());
    }

    lines.join("\n")
}
