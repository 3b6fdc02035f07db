//! `tracing` subscriber setup.
//!
//! Line-mode commands log to stderr. The TUI owns the terminal, so it logs to
//! a file when one is configured and discards log output otherwise.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// Log to stderr unless a log file is configured.
    Stderr,
    /// Log to the configured file, or nowhere.
    FileOnly,
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(settings: &Settings, sink: LogSink) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(&settings.log_filter)
        .map_err(|e| AppError::usage(format!("Invalid log filter '{}': {e}", settings.log_filter)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match (&settings.log_file, sink) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::runtime(format!("Failed to open log file '{}': {e}", path.display())))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        (None, LogSink::Stderr) => builder.with_writer(std::io::stderr).try_init(),
        (None, LogSink::FileOnly) => builder.with_writer(std::io::sink).try_init(),
    };

    // A subscriber set earlier (tests, embedding) wins.
    let _ = installed;
    Ok(())
}
