//! Tracing configuration and log routing.
//!
//! Console output goes to stdout for the server and to stderr for the CLI, whose stdout carries
//! JSON. Every process also appends to a log file: `DOCAI_CANON_LOG_FILE` when set, otherwise
//! `logs/docai-canon.log`. The file writer is non-blocking and kept alive by a global guard.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "docai-canon.log";

/// Stream receiving human-readable console logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutput {
    /// Standard output, used by the HTTP server.
    Stdout,
    /// Standard error, used when stdout carries program output.
    Stderr,
}

/// Configure tracing subscribers for console and file logging.
///
/// Respects `RUST_LOG` for filtering (defaults to `info`).
pub fn init_tracing(console: ConsoleOutput) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = (console == ConsoleOutput::Stdout)
        .then(|| fmt::layer().with_target(false).compact());
    let stderr_layer = (console == ConsoleOutput::Stderr).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });
    let file_layer = configure_file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

fn log_file_path() -> PathBuf {
    std::env::var_os("DOCAI_CANON_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE))
}

/// Build a non-blocking writer for file logging.
///
/// Returns `None` when the parent directory cannot be created or the file cannot be opened.
fn configure_file_writer() -> Option<NonBlocking> {
    let path = log_file_path();
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty())
        && let Err(err) = std::fs::create_dir_all(parent)
    {
        eprintln!("Failed to create log directory {}: {err}", parent.display());
        return None;
    }

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}
