use crate::error::Error;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation scope handed to every capability call of one switch.
///
/// Cancellation is cooperative: adapters should check [`is_cancelled`] or
/// select on [`cancelled`] during long operations. The orchestrator never
/// drops an in-flight call.
///
/// [`is_cancelled`]: SwitchContext::is_cancelled
/// [`cancelled`]: SwitchContext::cancelled
#[derive(Debug, Clone)]
pub struct SwitchContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl SwitchContext {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// A context that is never cancelled (useful for adapters' own tests).
    pub fn background() -> Self {
        Self::new(CancellationToken::new())
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if one is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline_exceeded()
    }

    /// Resolves once the token is cancelled or the deadline passes.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// The error to report when work on `what` stops because of this context.
    pub fn cancellation_error(&self, what: &str) -> Error {
        if self.deadline_exceeded() {
            Error::Timeout(what.to_string())
        } else {
            Error::Cancelled(what.to_string())
        }
    }
}
