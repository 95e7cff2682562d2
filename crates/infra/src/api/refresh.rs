//! Single-flight token refresh coordination
//!
//! At most one refresh is in flight per client. The first caller to see a
//! 401 becomes the leader and receives a [`RefreshLease`]; every caller that
//! arrives while the lease is held becomes a follower and parks on a oneshot
//! channel. Settling the lease clears the in-flight flag and drains the
//! queue under the same lock, so a 401 observed afterwards always starts a
//! fresh cycle instead of joining a finished one.

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use super::errors::ApiError;

type Outcome = Result<(), ApiError>;

#[derive(Debug, Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<Outcome>>,
}

/// Tracks the in-flight refresh and the callers waiting on it
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// Outcome of [`RefreshCoordinator::join`]
#[derive(Debug)]
pub enum RefreshRole<'a> {
    /// Caller must perform the refresh and settle the lease
    Leader(RefreshLease<'a>),
    /// Caller waits for the leader's outcome
    Follower(RefreshWaiter),
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Become the refresh leader, or queue behind the current one
    pub fn join(&self) -> RefreshRole<'_> {
        let mut state = self.state.lock();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            debug!(queued = state.waiters.len(), "Queued behind in-flight refresh");
            RefreshRole::Follower(RefreshWaiter { receiver: rx })
        } else {
            state.in_flight = true;
            RefreshRole::Leader(RefreshLease { coordinator: self, settled: false })
        }
    }

    /// Whether a refresh is currently running
    pub fn is_in_flight(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Number of callers parked behind the current refresh
    pub fn pending(&self) -> usize {
        self.state.lock().waiters.len()
    }

    fn settle(&self, outcome: &Outcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        let released = waiters.len();
        for waiter in waiters {
            // Receiver gone means the caller was cancelled; nothing to deliver.
            let _ = waiter.send(outcome.clone());
        }
        released
    }
}

/// Exclusive right to run the current refresh
///
/// Dropping an unsettled lease fails every queued caller, so a leader that
/// is cancelled or panics never strands followers.
#[derive(Debug)]
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Release queued callers to replay with the new token
    ///
    /// Returns the number of callers released.
    pub fn succeed(mut self) -> usize {
        self.settled = true;
        self.coordinator.settle(&Ok(()))
    }

    /// Reject every queued caller with `error`
    ///
    /// Returns the number of callers rejected.
    pub fn fail(mut self, error: ApiError) -> usize {
        self.settled = true;
        self.coordinator.settle(&Err(error))
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let released = self.coordinator.settle(&Err(ApiError::RefreshAbandoned));
            debug!(released, "Refresh lease dropped before settling");
        }
    }
}

/// Follower's handle on the leader's outcome
#[derive(Debug)]
pub struct RefreshWaiter {
    receiver: oneshot::Receiver<Outcome>,
}

impl RefreshWaiter {
    /// Wait for the leader to settle
    ///
    /// # Errors
    /// Returns the leader's failure, or `ApiError::RefreshAbandoned` if the
    /// leader vanished without settling
    pub async fn wait(self) -> Outcome {
        self.receiver.await.unwrap_or(Err(ApiError::RefreshAbandoned))
    }
}
