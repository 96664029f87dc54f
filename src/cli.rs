//! Command-line interface for svcready.
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

/// Wrapper around `LevelFilter` so clap can parse log levels from either
/// string names ("info", "debug", etc.) or numeric shorthands (0-5).
#[derive(Clone, Copy, Debug)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// String representation suitable for `RUST_LOG`.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("log level cannot be empty".into());
        }

        if let Ok(number) = trimmed.parse::<u8>() {
            let level = match number {
                0 => LevelFilter::OFF,
                1 => LevelFilter::ERROR,
                2 => LevelFilter::WARN,
                3 => LevelFilter::INFO,
                4 => LevelFilter::DEBUG,
                5 => LevelFilter::TRACE,
                _ => {
                    return Err(format!(
                        "unsupported log level number '{number}' (expected 0-5)"
                    ));
                }
            };

            return Ok(LogLevelArg(level));
        }

        let lowercase = trimmed.to_ascii_lowercase();
        let level = match lowercase.as_str() {
            "off" => Some(LevelFilter::OFF),
            "error" | "err" => Some(LevelFilter::ERROR),
            "warn" | "warning" => Some(LevelFilter::WARN),
            "info" | "information" => Some(LevelFilter::INFO),
            "debug" => Some(LevelFilter::DEBUG),
            "trace" => Some(LevelFilter::TRACE),
            _ => None,
        }
        .ok_or_else(|| format!("invalid log level '{trimmed}'"))?;

        Ok(LogLevelArg(level))
    }
}

/// Command-line interface for svcready.
#[derive(Parser)]
#[command(name = "svcready", version, author)]
#[command(about = "Make sure a system service is active before depending on it", long_about = None)]
pub struct Cli {
    /// Override the logging verbosity for this invocation only.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that addresses a unit.
#[derive(Args, Debug, Clone, Default)]
pub struct UnitArgs {
    /// Path to the configuration file (defaults to `svcready.yaml` when present).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Unit to act on, overriding the configuration.
    #[arg(short, long)]
    pub service: Option<String>,

    /// Service-manager program, overriding the configuration.
    #[arg(long, value_name = "PROGRAM")]
    pub manager: Option<String>,
}

/// Available commands for svcready.
#[derive(Subcommand)]
pub enum Commands {
    /// Make sure the unit is active, restarting it once if needed.
    Ensure {
        #[command(flatten)]
        unit: UnitArgs,

        /// Overall bound for the call (e.g., "10s", "500ms").
        #[arg(long, value_name = "DURATION")]
        timeout: Option<String>,

        /// Spacing between checks after a restart (e.g., "1s").
        #[arg(long, value_name = "DURATION")]
        poll_interval: Option<String>,
    },

    /// Report whether the unit is active without changing anything.
    Status {
        #[command(flatten)]
        unit: UnitArgs,

        /// Emit machine-readable JSON output.
        #[arg(long)]
        json: bool,
    },
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}
