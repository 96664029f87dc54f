//! Error handling for svcready.
use thiserror::Error;

use crate::context::DoneReason;

/// Failure of a single external command invocation.
#[derive(Debug, Error)]
pub enum RunError {
    /// The command could not be started.
    #[error("failed to spawn command: {0}")]
    Spawn(#[source] std::io::Error),

    /// The command ran but did not exit successfully.
    #[error("command exited with status {0:?}")]
    Exited(Option<i32>),

    /// Waiting on the running command failed.
    #[error("failed to wait for command: {0}")]
    Wait(#[source] std::io::Error),

    /// The context finished before the command did; any result was discarded.
    #[error("command abandoned: {0}")]
    Aborted(DoneReason),
}

/// Outcome of a failed readiness assurance.
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// The restart command could not be issued or reported failure.
    #[error("failed to restart {service}: {source}")]
    RestartFailed {
        /// Unit that was being restarted.
        service: String,
        /// The underlying command failure.
        #[source]
        source: RunError,
    },

    /// The deadline passed while waiting for the unit to report active.
    #[error("timeout reached: {service} did not become active")]
    TimeoutWaitingForActive {
        /// Unit that never reported active.
        service: String,
    },

    /// The settings were rejected before any command ran.
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] ConfigError),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error reading the configuration file.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Error parsing YAML configuration.
    #[error("Invalid YAML format: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A `${VAR}` reference named a variable that is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// A duration string could not be understood.
    #[error("Invalid duration value: '{0}'")]
    InvalidDuration(String),

    /// A duration was present but zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// Name of the offending setting.
        field: &'static str,
    },

    /// A name setting was blank.
    #[error("{field} cannot be empty")]
    Empty {
        /// Name of the offending setting.
        field: &'static str,
    },
}
