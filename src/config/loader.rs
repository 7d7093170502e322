//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServeBinConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<ServeBinConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ServeBinConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the deployment environment variables on top of a loaded config.
///
/// Recognised keys: `HOST`, `PORT`, `IS_SSL`, `IS_BACKUP_SERVER`, `MAIN_SERVER`.
pub fn apply_env_overrides<F>(config: &mut ServeBinConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("HOST").filter(|h| !h.is_empty());
    let port = lookup("PORT").filter(|p| !p.is_empty());
    if host.is_some() || port.is_some() {
        let (current_host, current_port) = split_host_port(&config.listener.bind_address);
        let host = host.unwrap_or(current_host);
        let port = port.unwrap_or(current_port);
        config.listener.bind_address = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };
    }

    if let Some(ssl) = lookup("IS_SSL") {
        config.public.ssl = ssl.eq_ignore_ascii_case("true");
    }

    if let Some(backup) = lookup("IS_BACKUP_SERVER") {
        config.backup.enabled = backup == "true";
    }

    if let Some(main) = lookup("MAIN_SERVER") {
        config.backup.main_server = main;
    }
}

fn split_host_port(address: &str) -> (String, String) {
    match address.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.to_string()),
        None => (address.to_string(), "8888".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn port_override_keeps_configured_host() {
        let mut config = ServeBinConfig::default();
        apply_env_overrides(&mut config, env(&[("PORT", "9000")]));
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn host_and_flags_override() {
        let mut config = ServeBinConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("HOST", "0.0.0.0"),
                ("IS_SSL", "TRUE"),
                ("IS_BACKUP_SERVER", "true"),
                ("MAIN_SERVER", "https://servebin.dev"),
            ]),
        );
        assert_eq!(config.listener.bind_address, "0.0.0.0:8888");
        assert!(config.public.ssl);
        assert!(config.backup.enabled);
        assert_eq!(config.backup.main_server, "https://servebin.dev");
    }

    #[test]
    fn load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nrequest_secs = 0").unwrap();

        match load_config(Some(file.path())) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nbind_address = 1").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Parse(_))
        ));
    }
}
