//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check cross-field consistency (backup mode needs a target)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServeBinConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServeBinConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("security.multipart_memory_limit ({memory}) exceeds security.max_body_size ({body})")]
    MultipartLimit { memory: usize, body: usize },

    #[error("backup.main_server must be set when backup mode is enabled")]
    MissingMainServer,

    #[error("backup.main_server `{0}` is not a valid URL")]
    MainServerUrl(String),

    #[error("heartbeat.latency_attempts must be greater than zero")]
    ZeroLatencyAttempts,
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &ServeBinConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let security = &config.security;
    if security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    } else if security.multipart_memory_limit > security.max_body_size {
        errors.push(ValidationError::MultipartLimit {
            memory: security.multipart_memory_limit,
            body: security.max_body_size,
        });
    }

    if config.backup.enabled {
        let main = config.backup.main_server.trim();
        if main.is_empty() {
            errors.push(ValidationError::MissingMainServer);
        } else if url::Url::parse(main).is_err() {
            errors.push(ValidationError::MainServerUrl(main.to_string()));
        }
    }

    if config.heartbeat.latency_attempts == 0 {
        errors.push(ValidationError::ZeroLatencyAttempts);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&ServeBinConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServeBinConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.backup.enabled = true;
        config.security.multipart_memory_limit = config.security.max_body_size + 1;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
        assert!(errors.contains(&ValidationError::MissingMainServer));
    }

    #[test]
    fn metrics_address_only_checked_when_enabled() {
        let mut config = ServeBinConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MetricsAddress("nope".into())])
        );
    }
}
