//! Single-Flight Refresh Coordination
//!
//! When several requests hit a 401 at once, exactly one of them runs
//! the refresh; the rest park on a oneshot and replay with whatever
//! the leader produced.

use std::sync::Mutex;

use tokio::sync::oneshot;

/// Marker for a refresh that ended in failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshFailed;

/// What the leader hands to every parked follower
pub type RefreshOutcome = Result<String, RefreshFailed>;

/// Role assigned to a request entering recovery
pub enum Flight {
    /// This request runs the refresh and must later call
    /// [`SingleFlight::resolve_all`] or [`SingleFlight::reject_all`]
    Leader,
    /// Another request is already refreshing; await its outcome
    Follower(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Default)]
struct Inner {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Coordinates at most one concurrent refresh
///
/// Lock scope is a few field accesses; nothing awaits while holding
/// it.
#[derive(Default)]
pub struct SingleFlight {
    inner: Mutex<Inner>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the flight: the first caller leads, the rest follow
    pub fn begin(&self) -> Flight {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if inner.in_flight {
            let (tx, rx) = oneshot::channel();
            inner.waiters.push(tx);
            Flight::Follower(rx)
        } else {
            inner.in_flight = true;
            Flight::Leader
        }
    }

    /// Leader path: refresh succeeded, wake every follower with the
    /// new access token
    pub fn resolve_all(&self, access_token: &str) {
        for waiter in self.finish() {
            let _ = waiter.send(Ok(access_token.to_string()));
        }
    }

    /// Leader path: refresh failed, wake every follower with the
    /// failure
    pub fn reject_all(&self) {
        for waiter in self.finish() {
            let _ = waiter.send(Err(RefreshFailed));
        }
    }

    fn finish(&self) -> Vec<oneshot::Sender<RefreshOutcome>> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.in_flight = false;
        std::mem::take(&mut inner.waiters)
    }
}
