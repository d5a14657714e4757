use crate::config::settings::DebugLogRotation;
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "ddg-search.log";

/// Keeps the background log writer alive; drop it to flush.
#[allow(dead_code)]
pub struct LogGuard(WorkerGuard);

/// Initialize logging.
///
/// Logs go to stderr unless `debug_log_path` is configured, in which case
/// they are written to that file with the configured rotation. stdout is
/// never used: it carries CLI output and the MCP stdio transport.
pub fn init(config: &Config, debug: bool) -> Result<LogGuard> {
    let debug = debug || config.debug;

    let (writer, log_file, guard) = match config.debug_log_path.as_deref() {
        Some(raw) => {
            let rotation = config
                .debug_log_rotation
                .unwrap_or(DebugLogRotation::Session);
            let (writer, path, guard) = open_log_file(raw, rotation, config.debug_log_keep)?;
            (writer, Some((path, rotation)), guard)
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, None, guard)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // Already initialized (e.g., in tests)

    if let Some((path, rotation)) = log_file {
        tracing::info!(log_file = %path.display(), rotation = ?rotation, "writing logs to file");
    }
    if debug {
        tracing::debug!("debug logging enabled");
    }

    Ok(LogGuard(guard))
}

/// Run `f` with a temporary stderr subscriber.
///
/// Config loading happens before [`init`] can pick a destination, so events
/// it emits (bad SEARCH_PROVIDER, which file was read) go to stderr here.
pub fn with_bootstrap<T>(debug: bool, f: impl FnOnce() -> T) -> T {
    with_bootstrap_writer(debug, std::io::stderr, f)
}

fn with_bootstrap_writer<W, T>(debug: bool, writer: W, f: impl FnOnce() -> T) -> T
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

/// RUST_LOG wins; otherwise debug our crate when asked, warn for everything else.
fn env_filter(debug: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(default_directives(debug))
}

fn default_directives(debug: bool) -> &'static str {
    if debug {
        "ddg_search=debug,warn"
    } else {
        "warn"
    }
}

fn open_log_file(
    raw: &str,
    rotation: DebugLogRotation,
    keep: Option<usize>,
) -> Result<(NonBlocking, PathBuf, WorkerGuard)> {
    let base = resolve_log_path(raw);

    match rotation {
        DebugLogRotation::None => {
            ensure_parent_dir(&base)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&base)
                .with_context(|| format!("Failed to open log file: {}", base.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, base, guard))
        }
        DebugLogRotation::Daily => {
            let (dir, base_name) = split_dir_and_name(&base)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            cleanup_rotated_logs(&dir, keep.unwrap_or(7), |name| is_daily_log(name, &base_name))?;

            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((writer, base, guard))
        }
        DebugLogRotation::Session => {
            let (dir, base_name) = split_dir_and_name(&base)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            cleanup_rotated_logs(&dir, keep.unwrap_or(20), |name| is_session_log(name, &base_name))?;

            let session_path = session_log_path(&dir, &base_name);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&session_path)
                .with_context(|| format!("Failed to open log file: {}", session_path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, session_path, guard))
        }
    }
}

/// A trailing separator or an existing directory means "put the log in here".
fn resolve_log_path(raw: &str) -> PathBuf {
    let path = PathBuf::from(expand_tilde(raw));
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return path.join(LOG_FILE_NAME);
    }
    path
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let suffix = raw.strip_prefix('~').unwrap_or("");
            return format!("{}{}", home.display(), suffix);
        }
    }
    raw.to_string()
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    Ok(())
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

fn session_log_path(dir: &Path, base_name: &str) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("{base_name}.session-{ts}"))
}

/// `{base_name}.YYYY-MM-DD`, as written by the daily appender
fn is_daily_log(name: &str, base_name: &str) -> bool {
    name.strip_prefix(base_name)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|date| chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok())
}

fn is_session_log(name: &str, base_name: &str) -> bool {
    name.strip_prefix(base_name)
        .is_some_and(|rest| rest.starts_with(".session-"))
}

/// Remove all but the `keep` newest files accepted by `matches`.
///
/// Rotated names sort chronologically, so lexicographic order is enough.
fn cleanup_rotated_logs(dir: &Path, keep: usize, matches: impl Fn(&str) -> bool) -> Result<()> {
    if keep == 0 {
        return Ok(());
    }

    let mut candidates: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else { continue };
        if matches(name) {
            candidates.push(name.to_string());
        }
    }

    candidates.sort();
    candidates.reverse();

    for name in candidates.iter().skip(keep) {
        let path = dir.join(name);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file");
        }
    }

    Ok(())
}
