//! Constants and default values for readiness assurance.
//!
//! This module centralizes the fixed timings, names and command arguments used
//! when talking to the service manager.

use std::time::Duration;

// ============================================================================
// Service Manager
// ============================================================================

/// Unit whose active state is assured when no other is configured.
pub const DEFAULT_SERVICE: &str = "pigpiod";

/// Service-manager program queried and mutated by default.
pub const DEFAULT_MANAGER: &str = "systemctl";

/// Flag passed to `is-active` so the manager reports through its exit code only.
pub const QUIET_FLAG: &str = "--quiet";

// ============================================================================
// Readiness Timing
// ============================================================================

/// Overall bound for a single assurance call, measured from invocation start.
pub const START_TIMEOUT: Duration = Duration::from_secs(10);

/// Spacing between active-state checks after a restart.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// Command Supervision
// ============================================================================

/// How often an in-flight command is polled for completion or cancellation.
pub const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Grace period between SIGTERM and SIGKILL for an abandoned command.
pub const COMMAND_KILL_GRACE: Duration = Duration::from_millis(100);

/// Longest single slice the system clock sleeps before re-checking cancellation.
pub const SLEEP_SLICE: Duration = Duration::from_millis(50);

// ============================================================================
// Configuration
// ============================================================================

/// Configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "svcready.yaml";
