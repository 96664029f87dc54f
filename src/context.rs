//! Cancellation and deadline propagation for a single assurance call.
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Why a [`Context`] stopped admitting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The owner of the cancel token asked everything to stop.
    Cancelled,
    /// The context deadline has passed.
    DeadlineExceeded,
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoneReason::Cancelled => write!(f, "context cancelled"),
            DoneReason::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags every holder of this token as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An optional absolute deadline paired with a cancel token.
///
/// Children derived through [`Context::with_deadline`] keep the earlier of the two
/// deadlines and share the parent's token, so cancelling the parent reaches every
/// operation running under a child.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: CancelToken,
}

impl Context {
    /// A context with no deadline and a fresh cancel token.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context with no deadline driven by an existing token.
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self {
            deadline: None,
            cancel,
        }
    }

    /// Derives a child bounded by `at`, or by the parent's deadline if that is earlier.
    pub fn with_deadline(&self, at: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(at),
            None => at,
        };

        Self {
            deadline: Some(deadline),
            cancel: self.cancel.clone(),
        }
    }

    /// Derives a child bounded by `now + timeout`.
    pub fn with_timeout(&self, now: Instant, timeout: Duration) -> Self {
        self.with_deadline(now + timeout)
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The token shared with this context's parent.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Reports whether the context is done at `now`. Cancellation wins over expiry.
    pub fn done(&self, now: Instant) -> Option<DoneReason> {
        if self.cancel.is_cancelled() {
            return Some(DoneReason::Cancelled);
        }

        match self.deadline {
            Some(deadline) if now >= deadline => Some(DoneReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Time left until the deadline at `now`, saturating at zero.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
