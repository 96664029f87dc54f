//! Configuration management for svcready.
use regex::{Captures, Regex};
use serde::Deserialize;
use std::{env, fs, path::Path, sync::LazyLock, time::Duration};

use crate::{
    constants::{
        CHECK_INTERVAL, DEFAULT_CONFIG_FILE, DEFAULT_MANAGER, DEFAULT_SERVICE,
        START_TIMEOUT,
    },
    error::ConfigError,
};

/// Represents the structure of the configuration file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Unit whose active state is assured.
    pub service: Option<String>,
    /// Service-manager program (e.g. `systemctl`).
    pub manager: Option<String>,
    /// Overall bound for one assurance call (e.g. "10s").
    pub timeout: Option<String>,
    /// Spacing between post-restart checks (e.g. "1s", "500ms").
    pub poll_interval: Option<String>,
}

/// Validated settings consumed by the readiness assurer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Unit name.
    pub service: String,
    /// Service-manager program.
    pub manager: String,
    /// Overall bound for one assurance call.
    pub timeout: Duration,
    /// Spacing between post-restart checks.
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            manager: DEFAULT_MANAGER.to_string(),
            timeout: START_TIMEOUT,
            poll_interval: CHECK_INTERVAL,
        }
    }
}

impl Settings {
    /// Builds settings from a parsed config, falling back to defaults for absent keys.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Self {
            service: config.service.clone().unwrap_or(defaults.service),
            manager: config.manager.clone().unwrap_or(defaults.manager),
            timeout: match &config.timeout {
                Some(raw) => parse_duration(raw)?,
                None => defaults.timeout,
            },
            poll_interval: match &config.poll_interval {
                Some(raw) => parse_duration(raw)?,
                None => defaults.poll_interval,
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Rejects blank names and zero durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.trim().is_empty() {
            return Err(ConfigError::Empty { field: "service" });
        }
        if self.manager.trim().is_empty() {
            return Err(ConfigError::Empty { field: "manager" });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroDuration { field: "timeout" });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "poll_interval",
            });
        }
        Ok(())
    }
}

/// Parses a user-facing duration string in the format `<number>[ms|s|m|h]`.
/// A bare number is read as seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidDuration(raw.to_string()));
    }

    let (amount_str, unit_ms) = if let Some(stripped) = value.strip_suffix("ms") {
        (stripped.trim(), 1)
    } else if let Some(stripped) = value.strip_suffix('s') {
        (stripped.trim(), 1_000)
    } else if let Some(stripped) = value.strip_suffix('m') {
        (stripped.trim(), 60_000)
    } else if let Some(stripped) = value.strip_suffix('h') {
        (stripped.trim(), 3_600_000)
    } else {
        (value, 1_000)
    };

    let amount: u64 = amount_str
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(raw.to_string()))?;

    Ok(Duration::from_millis(amount.saturating_mul(unit_ms)))
}

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?").expect("env var pattern is valid")
});

/// Expands `$VAR` and `${VAR}` references from the environment.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut missing = None;
    let result = ENV_VAR.replace_all(input, |caps: &Captures| {
        let var_name = &caps[1];
        env::var(var_name).unwrap_or_else(|_| {
            missing.get_or_insert_with(|| var_name.to_string());
            String::new()
        })
    });

    match missing {
        Some(var_name) => Err(ConfigError::MissingEnvVar(var_name)),
        None => Ok(result.into_owned()),
    }
}

/// Loads and parses the configuration file, expanding environment variables.
///
/// With no explicit path, `svcready.yaml` in the working directory is used if
/// present; otherwise the built-in defaults apply.
pub fn load_config(config_path: Option<&str>) -> Result<Config, ConfigError> {
    let config_path = match config_path {
        Some(path) => Path::new(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
        None => return Ok(Config::default()),
    };

    let content = fs::read_to_string(config_path).map_err(|e| {
        ConfigError::Read(std::io::Error::new(
            e.kind(),
            format!("{} ({})", e, config_path.display()),
        ))
    })?;

    let expanded = expand_env_vars(&content)?;
    if expanded.trim().is_empty() {
        return Ok(Config::default());
    }

    Ok(serde_yaml::from_str(&expanded)?)
}
