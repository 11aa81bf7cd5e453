//! Process-wide tracing setup shared by the server and the CLI.
//!
//! Events are printed to stdout and mirrored into a plain-text file, `DRIVEDIGEST_LOG_FILE`
//! or `logs/drivedigest.log`. A background worker owns the file writes; its guard is parked
//! in a static so buffered lines are flushed at exit.
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "DRIVEDIGEST_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/drivedigest.log";

static FILE_WORKER: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
///
/// Only the first call has an effect. If the log file cannot be opened, logging carries on
/// to stdout alone.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .try_init();
}

fn log_path() -> PathBuf {
    std::env::var_os(LOG_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn file_writer() -> Option<NonBlocking> {
    let path = log_path();
    match open_append(&path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = FILE_WORKER.set(guard);
            Some(writer)
        }
        Err(err) => {
            // The subscriber is not installed yet.
            eprintln!("drivedigest: not logging to {}: {err}", path.display());
            None
        }
    }
}

/// Open `path` for appending, creating missing parent directories first.
fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_file_parents_are_created_and_appended_to() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/run/drivedigest.log");

        writeln!(open_append(&path).expect("first open"), "one").expect("write");
        writeln!(open_append(&path).expect("second open"), "two").expect("write");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "one\ntwo\n");
    }
}
