//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, SigilConfig};

/// Validates the entire configuration.
///
/// Log levels are already checked while parsing. The prefix is compiled,
/// and so checked, when the runtime starts.
pub fn validate_config(config: &SigilConfig) -> ConfigResult<()> {
    validate_sudo(&config.sudo)?;
    validate_logging(&config.logging)?;
    Ok(())
}

/// Rejects empty entries inside a non-empty administrator list.
fn validate_sudo(sudo: &str) -> ConfigResult<()> {
    if sudo.trim().is_empty() {
        return Ok(());
    }

    for (position, entry) in sudo.split(',').enumerate() {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(ConfigError::validation(format!(
                "Empty administrator entry at position {} in sudo list '{sudo}'",
                position + 1
            )));
        }
        if entry.contains('@') {
            return Err(ConfigError::validation(format!(
                "Administrator '{entry}' must be a bare number, not an address"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is 'file'",
        ));
    }

    if let Some(module) = logging.filters.keys().find(|module| module.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid log filter module name: '{module}'"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&SigilConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_sudo_list() {
        let mut config = SigilConfig {
            sudo: "1, 2".into(),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());

        config.sudo = "1,,2".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.sudo = "1@s.whatsapp.net".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = SigilConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("sigil.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_filter_names() {
        let mut config = SigilConfig::default();
        config.logging.filters.insert(" ".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
