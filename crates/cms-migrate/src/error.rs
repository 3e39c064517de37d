//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, bad batch size, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database connection or query error (transient, retried).
    #[error("Source database error: {0}")]
    Source(#[from] sqlx::Error),

    /// Retries against the source are used up. Fatal: the run must stop.
    #[error(
        "Source connection refused {attempts} times. \
         Run the command again from the last logged offset."
    )]
    ConnectionExhausted { attempts: u32 },

    /// A record failed validation (e.g. malformed email). Counted, never fatal.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The destination store rejected a write. Counted, never fatal.
    #[error("Write failed for {entity}: {message}")]
    Write { entity: String, message: String },

    /// IO error (log file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Write error with the destination's message kept verbatim.
    pub fn write(entity: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Write {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Whether this error is recovered per record (logged + counted) rather
    /// than propagated.
    pub fn is_record_level(&self) -> bool {
        matches!(self, MigrateError::Validation(_) | MigrateError::Write { .. })
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) => 2,
            MigrateError::ConnectionExhausted { .. } => 3,
            _ => 1,
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
