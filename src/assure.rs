//! Readiness assurance: make sure a unit is active before depending on it.
//!
//! One call walks a small state machine. The unit is queried once; if it is not
//! active it is restarted exactly once and then re-queried on a fixed interval
//! until it reports active or the deadline passes. Every external call and every
//! wait runs under a single [`Context`] that combines the caller's context with the
//! configured timeout, so whichever bound is tighter wins.
use std::time::{Duration, Instant};

use crate::{
    clock::{Clock, SystemClock},
    config::Settings,
    context::Context,
    error::{ConfigError, ReadinessError},
    logs::{Logger, TracingLogger},
    runner::{CommandRunner, ProcessRunner},
    service::ServiceManager,
};

/// How a successful assurance was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The unit was active on the first query; nothing was restarted.
    AlreadyActive,
    /// The unit was restarted and reported active on poll number `polls`.
    ActiveAfterRestart {
        /// Post-restart queries performed, the successful one included.
        polls: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    CheckActive,
    Restarting,
    Polling { next_check: Instant, polls: u32 },
}

/// Decision taken at each turn of the polling phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollStep {
    /// The context is done; stop without querying again.
    Expired,
    /// The interval has elapsed; query the unit now.
    Check,
    /// Sleep this long, then decide again.
    Wait(Duration),
}

/// Expiry is evaluated before the tick, so a deadline that coincides with a due
/// check ends the loop without that check.
pub(crate) fn poll_step(now: Instant, next_check: Instant, ctx: &Context) -> PollStep {
    if ctx.done(now).is_some() {
        return PollStep::Expired;
    }

    if now >= next_check {
        return PollStep::Check;
    }

    let until_tick = next_check - now;
    match ctx.remaining(now) {
        Some(remaining) => PollStep::Wait(until_tick.min(remaining)),
        None => PollStep::Wait(until_tick),
    }
}

/// Check, restart and poll a single unit through injected collaborators.
///
/// Concurrent calls are independent; each runs its own full cycle.
pub struct ReadinessAssurer<R, C, L> {
    runner: R,
    clock: C,
    logger: L,
    settings: Settings,
}

impl<R, C, L> ReadinessAssurer<R, C, L>
where
    R: ProcessRunner,
    C: Clock,
    L: Logger,
{
    /// Creates an assurer from its collaborators.
    ///
    /// # Errors
    /// Returns the [`ConfigError`] from [`Settings::validate`]; a zero interval would
    /// turn the poll loop into a busy spin.
    pub fn new(
        runner: R,
        clock: C,
        logger: L,
        settings: Settings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            runner,
            clock,
            logger,
            settings,
        })
    }

    /// The runner used for service-manager calls.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The logger receiving success events.
    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Makes sure the unit is active, restarting it at most once.
    ///
    /// The effective deadline is the earlier of `parent`'s deadline and
    /// `settings.timeout` from now. Exactly one info event is logged on success and
    /// none on failure.
    ///
    /// # Errors
    /// * [`ReadinessError::RestartFailed`] when the restart command fails or cannot
    ///   run before the deadline. No polling happens in that case.
    /// * [`ReadinessError::TimeoutWaitingForActive`] when the context is done before
    ///   a post-restart query reports active.
    pub fn ensure_running(&self, parent: &Context) -> Result<Readiness, ReadinessError> {
        let ctx = parent.with_timeout(self.clock.now(), self.settings.timeout);
        let unit = self.settings.service.as_str();
        let manager = ServiceManager::new(&self.runner, &self.settings.manager, unit);
        let interval = self.settings.poll_interval;

        let mut phase = Phase::CheckActive;
        loop {
            phase = match phase {
                Phase::CheckActive => {
                    if manager.is_active(&ctx) {
                        self.logger.info(&format!("{unit} is already running"));
                        return Ok(Readiness::AlreadyActive);
                    }
                    Phase::Restarting
                }
                Phase::Restarting => {
                    manager.restart(&ctx).map_err(|source| {
                        ReadinessError::RestartFailed {
                            service: unit.to_string(),
                            source,
                        }
                    })?;
                    Phase::Polling {
                        next_check: self.clock.now() + interval,
                        polls: 0,
                    }
                }
                Phase::Polling { next_check, polls } => {
                    match poll_step(self.clock.now(), next_check, &ctx) {
                        PollStep::Expired => {
                            return Err(ReadinessError::TimeoutWaitingForActive {
                                service: unit.to_string(),
                            });
                        }
                        PollStep::Wait(duration) => {
                            self.clock.sleep(duration, &ctx);
                            Phase::Polling { next_check, polls }
                        }
                        PollStep::Check => {
                            let polls = polls + 1;
                            // A result that lands after expiry is discarded.
                            if manager.is_active(&ctx)
                                && ctx.done(self.clock.now()).is_none()
                            {
                                self.logger
                                    .info(&format!("{unit} is running after restart"));
                                return Ok(Readiness::ActiveAfterRestart { polls });
                            }
                            Phase::Polling {
                                next_check: self.clock.now() + interval,
                                polls,
                            }
                        }
                    }
                }
            };
        }
    }
}

/// Runs [`ReadinessAssurer::ensure_running`] against the real service manager,
/// logging through `tracing`.
///
/// Invalid `settings` are reported as [`ReadinessError::InvalidSettings`] before any
/// command runs.
pub fn ensure_running(
    ctx: &Context,
    settings: &Settings,
) -> Result<Readiness, ReadinessError> {
    let logger = TracingLogger::new(settings.service.clone());
    ReadinessAssurer::new(CommandRunner, SystemClock, logger, settings.clone())?
        .ensure_running(ctx)
}
