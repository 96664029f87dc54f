//! Deterministic collaborators for exercising readiness assurance without a real
//! service manager or wall-clock waits.
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::{
    clock::Clock,
    context::Context,
    error::RunError,
    logs::Logger,
    runner::ProcessRunner,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Virtual clock that only moves when slept on or advanced explicitly.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Starts the clock at the current instant.
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Moves virtual time forward by `by`.
    pub fn advance(&self, by: Duration) {
        *lock(&self.now) += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *lock(&self.now)
    }

    fn sleep(&self, duration: Duration, ctx: &Context) {
        if ctx.cancel_token().is_cancelled() {
            return;
        }
        self.advance(duration);
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Success,
    Exit(i32),
    SpawnFailure,
}

/// One scripted command result.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    outcome: Outcome,
    duration: Duration,
    late: bool,
}

impl Step {
    /// Command exits with status 0.
    pub fn ok() -> Self {
        Self {
            outcome: Outcome::Success,
            duration: Duration::ZERO,
            late: false,
        }
    }

    /// Command exits with `code`.
    pub fn fail(code: i32) -> Self {
        Self {
            outcome: Outcome::Exit(code),
            duration: Duration::ZERO,
            late: false,
        }
    }

    /// Command cannot be started.
    pub fn spawn_error() -> Self {
        Self {
            outcome: Outcome::SpawnFailure,
            duration: Duration::ZERO,
            late: false,
        }
    }

    /// Command takes `duration` of virtual time before finishing.
    pub fn taking(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Command reports its outcome even if `duration` runs past the deadline,
    /// like a runner that only notices the exit after the context expired.
    pub fn ignoring_deadline(mut self) -> Self {
        self.late = true;
        self
    }
}

/// A recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    /// Program and arguments joined by spaces.
    pub command: String,
    /// Virtual time at which the call started.
    pub started: Instant,
}

/// [`ProcessRunner`] that replays a script of results.
///
/// Once the script is exhausted every call yields the fallback step. When bound to a
/// [`ManualClock`], a step's duration advances virtual time, stopping at the context
/// deadline the way a well-behaved runner abandons an in-flight command.
pub struct ScriptedRunner {
    steps: Mutex<VecDeque<Step>>,
    fallback: Step,
    clock: Option<ManualClock>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedRunner {
    /// Replays `steps` in order, then fails with status 3 (`inactive`).
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            fallback: Step::fail(3),
            clock: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Uses `step` once the script runs out.
    pub fn otherwise(mut self, step: Step) -> Self {
        self.fallback = step;
        self
    }

    /// Drives `clock` with step durations and timestamps calls with it.
    pub fn with_clock(mut self, clock: ManualClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Every command issued so far.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|call| call.command.clone()).collect()
    }

    /// Every command issued so far with its start time.
    pub fn timed_calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Number of commands whose arguments contain `verb`.
    pub fn count(&self, verb: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.command.split(' ').any(|arg| arg == verb))
            .count()
    }

    fn now(&self) -> Instant {
        self.clock
            .as_ref()
            .map(Clock::now)
            .unwrap_or_else(Instant::now)
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, ctx: &Context, program: &str, args: &[&str]) -> Result<(), RunError> {
        if let Some(reason) = ctx.done(self.now()) {
            return Err(RunError::Aborted(reason));
        }

        let mut command = program.to_string();
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }
        lock(&self.calls).push(Call {
            command,
            started: self.now(),
        });

        let step = lock(&self.steps).pop_front().unwrap_or(self.fallback);

        if let Some(clock) = &self.clock {
            let budget = ctx.remaining(clock.now()).unwrap_or(step.duration);
            if step.duration >= budget && ctx.deadline().is_some() && !step.late {
                clock.advance(budget);
                if let Some(reason) = ctx.done(clock.now()) {
                    return Err(RunError::Aborted(reason));
                }
            } else {
                clock.advance(step.duration);
            }
        }

        match step.outcome {
            Outcome::Success => Ok(()),
            Outcome::Exit(code) => Err(RunError::Exited(Some(code))),
            Outcome::SpawnFailure => Err(RunError::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{program}: not found"),
            ))),
        }
    }
}

/// [`Logger`] that keeps every message for later inspection.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    messages: Mutex<Vec<String>>,
}

impl RecordingLogger {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl Logger for RecordingLogger {
    fn info(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}
