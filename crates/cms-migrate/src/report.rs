//! Run log rendering: severity-prefixed lines to an optional log file,
//! mirrored to the console through `tracing` when enabled.

use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{error, info, warn};

/// Log line severity. The prefix is the wire format of the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Plain,
    Error,
    Success,
    Warning,
}

impl Severity {
    /// Prefix written ahead of the message in the log file.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::Plain => "",
            Severity::Error => "Error: ",
            Severity::Success => "Success: ",
            Severity::Warning => "Warning: ",
        }
    }
}

/// Sink for run log lines.
///
/// Lines are appended to the log file when one is configured, and mirrored
/// to the console when `console` is on. File writes are best-effort: a full
/// disk must not abort a migration.
pub struct Reporter {
    log_file: Option<File>,
    console: bool,
}

impl Reporter {
    /// Open a reporter. The log file is created if missing and appended to.
    pub fn new(log_file: Option<&Path>, console: bool) -> Result<Self> {
        let log_file = match log_file {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };
        Ok(Self { log_file, console })
    }

    /// A reporter that discards everything except console output.
    #[must_use]
    pub fn console_only(console: bool) -> Self {
        Self {
            log_file: None,
            console,
        }
    }

    /// Whether console mirroring is enabled.
    #[must_use]
    pub fn console(&self) -> bool {
        self.console
    }

    /// Write one log line.
    pub fn log(&self, severity: Severity, message: &str) {
        if let Some(file) = &self.log_file {
            let mut file = file;
            let _ = writeln!(file, "{}{}", severity.prefix(), message);
        }

        if self.console {
            match severity {
                Severity::Error => error!("{}", message),
                Severity::Warning => warn!("{}", message),
                Severity::Success | Severity::Plain => info!("{}", message),
            }
        }
    }

    pub fn plain(&self, message: &str) {
        self.log(Severity::Plain, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }

    pub fn success(&self, message: &str) {
        self.log(Severity::Success, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Severity::Warning, message);
    }
}
