//! Service-manager verbs for a single unit.
use strum_macros::{AsRefStr, EnumString};

use crate::{
    constants::QUIET_FLAG, context::Context, error::RunError, runner::ProcessRunner,
};

/// The two operations issued against the service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ManagerVerb {
    /// Report through the exit code whether the unit is active.
    IsActive,
    /// Stop the unit if running and start it again.
    Restart,
}

/// A unit addressed through a service-manager program such as `systemctl`.
pub struct ServiceManager<'a> {
    runner: &'a dyn ProcessRunner,
    manager: &'a str,
    unit: &'a str,
}

impl<'a> ServiceManager<'a> {
    /// Binds `unit` on `manager` to `runner`.
    pub fn new(runner: &'a dyn ProcessRunner, manager: &'a str, unit: &'a str) -> Self {
        Self {
            runner,
            manager,
            unit,
        }
    }

    /// Queries the manager afresh. Any failure, abandonment included, counts as inactive.
    pub fn is_active(&self, ctx: &Context) -> bool {
        self.runner
            .run(
                ctx,
                self.manager,
                &[ManagerVerb::IsActive.as_ref(), QUIET_FLAG, self.unit],
            )
            .is_ok()
    }

    /// Asks the manager to restart the unit. Success means the request was accepted,
    /// not that the unit is already active.
    pub fn restart(&self, ctx: &Context) -> Result<(), RunError> {
        self.runner
            .run(ctx, self.manager, &[ManagerVerb::Restart.as_ref(), self.unit])
    }
}
