//! Configuration loading, environment overrides, validation.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::CalcgridConfig;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load configuration from a YAML file, apply environment overrides,
/// validate.
pub fn load_config(path: &Path) -> Result<CalcgridConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: CalcgridConfig = serde_yaml::from_str(&content)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file falls back to pure defaults so
/// the binaries run without any config on disk.
pub fn load_config_or_default(path: &Path) -> Result<CalcgridConfig, ConfigError> {
    if !path.exists() {
        let mut config = CalcgridConfig::default();
        apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        validate_config(&config)?;
        return Ok(config);
    }
    load_config(path)
}

// Environment variable names match the deployment surface documented in
// config/calcgrid.yaml.
const ENV_OVERRIDES: &[(&str, Field)] = &[
    ("SERVER_LISTEN", Field::Listen),
    ("TIME_ADDITION_MS", Field::AdditionMs),
    ("TIME_SUBTRACTION_MS", Field::SubtractionMs),
    ("TIME_MULTIPLIER_MS", Field::MultiplicationMs),
    ("TIME_DIVISION_MS", Field::DivisionMs),
    ("COMPUTING_POWER", Field::ComputingPower),
];

#[derive(Clone, Copy)]
enum Field {
    Listen,
    AdditionMs,
    SubtractionMs,
    MultiplicationMs,
    DivisionMs,
    ComputingPower,
}

fn apply_env_overrides(
    config: &mut CalcgridConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    for (name, field) in ENV_OVERRIDES {
        let Some(raw) = lookup(name) else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match field {
            Field::Listen => config.server.listen = raw.to_string(),
            Field::AdditionMs => config.operations.addition_ms = parse_env(name, raw)?,
            Field::SubtractionMs => config.operations.subtraction_ms = parse_env(name, raw)?,
            Field::MultiplicationMs => {
                config.operations.multiplication_ms = parse_env(name, raw)?
            }
            Field::DivisionMs => config.operations.division_ms = parse_env(name, raw)?,
            Field::ComputingPower => config.agent.computing_power = parse_env(name, raw)?,
        }
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a number, got '{raw}'")))
}

fn validate_config(config: &CalcgridConfig) -> Result<(), ConfigError> {
    if config.server.listen.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "server.listen must not be empty".to_string(),
        ));
    }

    if config.agent.computing_power == 0 {
        return Err(ConfigError::Invalid(
            "agent.computing_power must be > 0".to_string(),
        ));
    }

    if config.agent.poll_interval_ms == 0 {
        return Err(ConfigError::Invalid(
            "agent.poll_interval_ms must be > 0".to_string(),
        ));
    }

    if config.dispatch.claim_timeout_ms == Some(0) {
        return Err(ConfigError::Invalid(
            "dispatch.claim_timeout_ms must be > 0 when set".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_validates() {
        let config = CalcgridConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.server.listen, "127.0.0.1:8080");
        assert_eq!(config.operations.addition_ms, 1000);
        assert_eq!(config.operations.multiplication_ms, 2000);
        assert_eq!(config.agent.computing_power, 4);
        assert_eq!(config.dispatch.claim_timeout_ms, None);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
server:
  listen: "0.0.0.0:9000"
operations:
  division_ms: 500
dispatch:
  claim_timeout_ms: 60000
"#;
        let config: CalcgridConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert_eq!(config.operations.division_ms, 500);
        assert_eq!(config.operations.addition_ms, 1000);
        assert_eq!(config.dispatch.claim_timeout_ms, Some(60000));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TIME_ADDITION_MS", "250"),
            ("COMPUTING_POWER", "8"),
            ("SERVER_LISTEN", "0.0.0.0:8081"),
        ]);
        let mut config = CalcgridConfig::default();
        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.operations.addition_ms, 250);
        assert_eq!(config.agent.computing_power, 8);
        assert_eq!(config.server.listen, "0.0.0.0:8081");
        // Untouched fields keep their defaults.
        assert_eq!(config.operations.subtraction_ms, 1000);
    }

    #[test]
    fn test_non_numeric_env_override_is_invalid() {
        let mut config = CalcgridConfig::default();
        let err = apply_env_overrides(&mut config, |name| {
            (name == "TIME_DIVISION_MS").then(|| "fast".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_validation_rejects_zero_computing_power() {
        let mut config = CalcgridConfig::default();
        config.agent.computing_power = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_claim_timeout() {
        let mut config = CalcgridConfig::default();
        config.dispatch.claim_timeout_ms = Some(0);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }
}
