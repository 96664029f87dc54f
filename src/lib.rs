//! svcready makes sure an OS-level background service is active before a client
//! depends on it. It queries the service manager once, restarts the unit if it is
//! not active, and then polls on a fixed interval until the unit reports active or
//! a deadline passes.

/// Readiness assurance state machine.
pub mod assure;

/// CLI interface.
pub mod cli;

/// Time source abstraction.
pub mod clock;

/// Configuration management.
pub mod config;

/// Fixed timings and names.
pub mod constants;

/// Cancellation and deadline propagation.
pub mod context;

/// Error handling.
pub mod error;

/// Success-event logging.
pub mod logs;

/// Deadline-bound external command execution.
pub mod runner;

/// Service-manager verbs.
pub mod service;

/// Deterministic collaborators for tests.
#[doc(hidden)]
pub mod test_utils;

pub use assure::{Readiness, ReadinessAssurer, ensure_running};
pub use context::{CancelToken, Context};
pub use error::ReadinessError;
