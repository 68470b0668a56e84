//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{ClientSettings, LogOutput, LoggingConfig, RivetConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &RivetConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_client_settings(&config.client)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    for module in logging.filters.keys() {
        if module.is_empty() || module.contains(char::is_whitespace) {
            return Err(ConfigError::validation(format!(
                "Invalid module name in logging.filters: '{module}'"
            )));
        }
    }

    Ok(())
}

fn validate_client_settings(client: &ClientSettings) -> ConfigResult<()> {
    if client.autodefer_grace_ms == 0 {
        return Err(ConfigError::validation(
            "Autodefer grace period must be greater than 0",
        ));
    }

    // Interactions must be acknowledged within three seconds.
    if client.autodefer_grace_ms >= 3000 {
        return Err(ConfigError::validation(
            "Autodefer grace period must be shorter than 3000 ms",
        ));
    }

    Ok(())
}
