use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Bot token is not empty
/// - Direct delivery limit is not 0
///
/// Provider completeness is deliberately not validated here; a misconfigured
/// upload provider is reported per request at delivery time, so the bot keeps
/// serving direct deliveries in the meantime.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.bot.token.is_empty() {
        return Err(ConfigError::ValidationError(
            "bot.token cannot be empty".to_string(),
        ));
    }

    if config.delivery.direct_limit_mib == 0 {
        return Err(ConfigError::ValidationError(
            "delivery.direct_limit_mib cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BotConfig, DeliveryConfig, UploadConfig, UploadProvider};

    fn config() -> Config {
        Config {
            bot: BotConfig {
                token: "123:abc".to_string(),
                poll_timeout_secs: 30,
            },
            delivery: DeliveryConfig::default(),
            upload: UploadConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&config()).is_ok());
    }

    #[test]
    fn test_validate_empty_token_fails() {
        let mut config = config();
        config.bot.token = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_limit_fails() {
        let mut config = config();
        config.delivery.direct_limit_mib = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_incomplete_provider_passes_startup_validation() {
        let mut config = config();
        config.upload.provider = UploadProvider::ObjectStorage;
        assert!(validate_config(&config).is_ok());
    }
}
