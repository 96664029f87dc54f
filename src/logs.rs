//! Informational event sink used on success paths.
use tracing::info;

/// Records informational events. Fire-and-forget.
pub trait Logger: Send + Sync {
    /// Records `message` at info level.
    fn info(&self, message: &str);
}

/// [`Logger`] that forwards to `tracing`, tagging each event with the unit name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    unit: String,
}

impl TracingLogger {
    /// Creates a logger for events about `unit`.
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        info!(unit = %self.unit, "{message}");
    }
}
