//! Deadline-bound execution of external commands.
use std::{
    process::{Child, Command, ExitStatus, Stdio},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use nix::{
    errno::Errno,
    sys::signal::{self, Signal},
    unistd::Pid,
};
use tracing::{debug, warn};

use crate::{
    constants::{COMMAND_KILL_GRACE, COMMAND_POLL_INTERVAL},
    context::{Context, DoneReason},
    error::RunError,
};

/// Runs a named external command under a context.
///
/// Implementations must return promptly once `ctx` is done, reporting
/// [`RunError::Aborted`] instead of waiting for the command to finish.
pub trait ProcessRunner: Send + Sync {
    /// Executes `program` with `args`. `Ok(())` means the command exited successfully.
    fn run(&self, ctx: &Context, program: &str, args: &[&str]) -> Result<(), RunError>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for Arc<T> {
    fn run(&self, ctx: &Context, program: &str, args: &[&str]) -> Result<(), RunError> {
        (**self).run(ctx, program, args)
    }
}

/// [`ProcessRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl ProcessRunner for CommandRunner {
    fn run(&self, ctx: &Context, program: &str, args: &[&str]) -> Result<(), RunError> {
        if let Some(reason) = ctx.done(Instant::now()) {
            return Err(RunError::Aborted(reason));
        }

        debug!("Running `{} {}`", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(RunError::Spawn)?;

        match wait_with_context(&mut child, ctx).map_err(RunError::Wait)? {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(RunError::Exited(status.code())),
            Err(reason) => {
                abandon(&mut child, program);
                Err(RunError::Aborted(reason))
            }
        }
    }
}

/// Waits for `child` until it exits or `ctx` is done.
///
/// The context is checked before each `try_wait`, so an exit observed after the
/// deadline is discarded rather than reported.
fn wait_with_context(
    child: &mut Child,
    ctx: &Context,
) -> std::io::Result<Result<ExitStatus, DoneReason>> {
    loop {
        if let Some(reason) = ctx.done(Instant::now()) {
            return Ok(Err(reason));
        }

        if let Some(status) = child.try_wait()? {
            return Ok(Ok(status));
        }

        thread::sleep(COMMAND_POLL_INTERVAL);
    }
}

/// Wait for a child process with a timeout, returning `Ok(None)` on timeout.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait()? {
            Some(status) => return Ok(Some(status)),
            None => {
                if Instant::now() >= deadline {
                    return Ok(None);
                }
                thread::sleep(COMMAND_POLL_INTERVAL);
            }
        }
    }
}

/// Terminates a command whose result is no longer wanted and reaps it.
fn abandon(child: &mut Child, program: &str) {
    let pid = Pid::from_raw(child.id() as i32);
    match signal::kill(pid, Some(Signal::SIGTERM)) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!("Failed to signal abandoned `{program}` (PID {pid}): {err}"),
    }

    match wait_with_timeout(child, COMMAND_KILL_GRACE) {
        Ok(Some(_)) => return,
        Ok(None) => debug!("`{program}` ignored SIGTERM; killing"),
        Err(err) => debug!("Failed to poll abandoned `{program}`: {err}"),
    }

    if let Err(err) = child.kill() {
        warn!("Failed to kill abandoned `{program}` (PID {pid}): {err}");
    }
    if let Err(err) = child.wait() {
        debug!("Failed to reap abandoned `{program}` (PID {pid}): {err}");
    }
}
