//! Single-flight coordination of token refreshes
//!
//! The in-progress flag and the pending queue are one value: `Some(waiters)`
//! while a refresh is in flight, `None` when idle. Joining a cycle and
//! starting one happen inside a single critical section with no await point,
//! so two callers can never both become the refresh leader.

use super::error::{ClientError, RefreshError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

pub(crate) type RefreshOutcome = Result<String, RefreshError>;

type Waiters = Vec<oneshot::Sender<RefreshOutcome>>;

#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    pending: Mutex<Option<Waiters>>,
}

/// How a caller that saw a 401 obtains its next access token
pub(crate) enum RefreshTicket<'a> {
    /// The caller must perform the refresh and report the outcome
    Lead(RefreshLease<'a>),
    /// Another caller is refreshing; the outcome arrives here
    Wait(oneshot::Receiver<RefreshOutcome>),
    /// A refresh finished after the failing request was sent
    Rotated(String),
}

impl RefreshCoordinator {
    fn lock(&self) -> MutexGuard<'_, Option<Waiters>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        self.lock().is_some()
    }

    /// Join the running cycle, or start a new one unless `rotated` reports a
    /// token newer than the one the failing request carried
    pub(crate) fn enter<F>(&self, rotated: F) -> Result<RefreshTicket<'_>, ClientError>
    where
        F: FnOnce() -> Result<Option<String>, ClientError>,
    {
        let mut pending = self.lock();

        if let Some(waiters) = pending.as_mut() {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            trace!(queued = waiters.len(), "joined in-flight token refresh");
            return Ok(RefreshTicket::Wait(rx));
        }

        if let Some(token) = rotated()? {
            return Ok(RefreshTicket::Rotated(token));
        }

        *pending = Some(Vec::new());
        Ok(RefreshTicket::Lead(RefreshLease {
            coordinator: self,
            finished: false,
        }))
    }

    /// Drain the queue in enqueue order and return to idle
    fn finish(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = self.lock().take().unwrap_or_default();
        let count = waiters.len();
        for waiter in waiters {
            // A waiter whose caller went away just misses the result
            let _ = waiter.send(outcome.clone());
        }
        count
    }
}

/// Held by the refresh leader. Dropping it unfinished fails every waiter with
/// [`RefreshError::Abandoned`] so nobody waits forever.
pub(crate) struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    finished: bool,
}

impl RefreshLease<'_> {
    /// Publish the outcome to all waiters; returns how many were woken
    pub(crate) fn complete(mut self, outcome: &RefreshOutcome) -> usize {
        self.finished = true;
        self.coordinator.finish(outcome)
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.coordinator.finish(&Err(RefreshError::Abandoned));
        }
    }
}

/// Wait for the leader's outcome
pub(crate) async fn wait(rx: oneshot::Receiver<RefreshOutcome>) -> RefreshOutcome {
    rx.await.unwrap_or(Err(RefreshError::Abandoned))
}
