//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}

fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_env(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables on `config`.
///
/// Empty values are treated as unset. `lookup` abstracts the environment so
/// the mapping can be tested without mutating process state.
pub fn apply_env<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(level) = var("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    if let Some(port) = var("PORT") {
        config.listener.port = port.parse().map_err(|e| ConfigError::Env {
            var: "PORT",
            message: format!("{}: {}", port, e),
        })?;
    }

    if let Some(region) = var("AWS_REGION") {
        config.invocation.region = region;
    }

    if let Some(endpoint) = var("LAMBDA_ENDPOINT") {
        config.invocation.endpoint = Some(endpoint);
    }

    if let Some(header) = var("REQUEST_ID_HEADER") {
        config.listener.request_id_header = Some(header);
    }

    if let Some(flag) = var("STATS_RECORDER") {
        config.stats.recorder_enabled = flag == "true";
    }

    if let Some(url) = var("STATS_REPORT_URL") {
        config.stats.report_url = Some(url);
    }

    if let Some(interval) = var("STATS_REPORT_INTERVAL") {
        config.stats.report_interval =
            humantime::parse_duration(&interval).map_err(|e| ConfigError::Env {
                var: "STATS_REPORT_INTERVAL",
                message: format!("{}: {}", interval, e),
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("LOG_LEVEL", "info"),
                ("PORT", "9000"),
                ("AWS_REGION", "us-east-1"),
                ("REQUEST_ID_HEADER", "X-Req-Id"),
                ("STATS_REPORT_URL", "http://collector:8080"),
                ("STATS_REPORT_INTERVAL", "250ms"),
            ]),
        )
        .unwrap();

        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.listener.port, 9000);
        assert_eq!(
            config.invocation.resolved_endpoint(),
            "https://lambda.us-east-1.amazonaws.com"
        );
        assert_eq!(config.listener.request_id_header.as_deref(), Some("X-Req-Id"));
        assert!(config.stats.recorder_enabled());
        assert_eq!(config.stats.report_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let mut config = GatewayConfig::default();
        apply_env(&mut config, env(&[("PORT", ""), ("REQUEST_ID_HEADER", "")])).unwrap();
        assert_eq!(config.listener.port, 8090);
        assert!(config.listener.request_id_header.is_none());
    }

    #[test]
    fn test_recorder_flag_requires_literal_true() {
        let mut config = GatewayConfig::default();
        apply_env(&mut config, env(&[("STATS_RECORDER", "yes")])).unwrap();
        assert!(!config.stats.recorder_enabled());

        apply_env(&mut config, env(&[("STATS_RECORDER", "true")])).unwrap();
        assert!(config.stats.recorder_enabled());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = GatewayConfig::default();
        let err = apply_env(&mut config, env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));

        let err = apply_env(&mut config, env(&[("STATS_REPORT_INTERVAL", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "STATS_REPORT_INTERVAL", .. }));
    }

    fn temp_config(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("gateway-{}-{}.toml", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_validates_file() {
        let path = temp_config("invalid", "[listener]\nport = 0\n");

        let err = load_with(Some(&path), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors == &[ValidationError::ZeroPort]));

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_env_overrides_file_values() {
        let path = temp_config(
            "overlay",
            "[listener]\nport = 9100\n\n[invocation]\nregion = \"us-west-2\"\n",
        );

        let config = load_with(Some(&path), env(&[("PORT", "9200")])).unwrap();
        assert_eq!(config.listener.port, 9200);
        assert_eq!(config.invocation.region, "us-west-2");

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = load_with(None, env(&[])).unwrap();
        assert_eq!(config.listener.port, 8090);
        assert_eq!(config.invocation.region, "eu-west-1");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("gateway-does-not-exist.toml");
        assert!(matches!(load_with(Some(&path), env(&[])), Err(ConfigError::Io(_))));
    }
}
