//! Time source used by the readiness loop.
use std::{
    thread,
    time::{Duration, Instant},
};

use crate::{constants::SLEEP_SLICE, context::Context};

/// Supplies the current time and a cancellable sleep.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Sleeps for `duration`, returning early if `ctx` is cancelled.
    fn sleep(&self, duration: Duration, ctx: &Context);
}

/// Wall-clock implementation backed by [`Instant::now`] and [`thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration, ctx: &Context) {
        let until = Instant::now() + duration;
        loop {
            if ctx.cancel_token().is_cancelled() {
                return;
            }

            let now = Instant::now();
            if now >= until {
                return;
            }

            thread::sleep((until - now).min(SLEEP_SLICE));
        }
    }
}
