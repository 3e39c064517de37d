//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration. Must pass before any destination mutation.
pub fn validate(config: &Config) -> Result<()> {
    if config.migration.batch == 0 {
        return Err(MigrateError::Config(
            "migration.batch must be greater than zero".into(),
        ));
    }

    if let Some(0) = config.migration.batch_limit {
        return Err(MigrateError::Config(
            "migration.batch_limit must be at least 1 when set".into(),
        ));
    }

    // Partial source credentials are a misconfiguration; an entirely empty
    // source is the supported inert mode.
    if config.source.is_configured() {
        if config.source.database.is_empty() {
            return Err(MigrateError::Config("source.database is required".into()));
        }
        if config.source.user.is_empty() {
            return Err(MigrateError::Config("source.user is required".into()));
        }
    }

    Ok(())
}
