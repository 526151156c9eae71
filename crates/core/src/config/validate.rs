use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Cookie is not empty
/// - Project id is not 0
/// - Timeout and count are not 0
///
/// Index ranges are not checked here; they can only be judged against the
/// lists the API returns.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api.cookie.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.cookie cannot be empty".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.purchase.project_id == 0 {
        return Err(ConfigError::ValidationError(
            "purchase.project_id cannot be 0".to_string(),
        ));
    }

    if config.purchase.count == 0 {
        return Err(ConfigError::ValidationError(
            "purchase.count cannot be 0".to_string(),
        ));
    }

    Ok(())
}
