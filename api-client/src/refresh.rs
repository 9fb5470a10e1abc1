use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use hirelane_auth::TokenNamespace;
use tokio::sync::oneshot;
use tracing::trace;

use crate::error::RefreshFailedReason;

/// Outcome of one refresh cycle: the fresh token, or the shared reason it
/// failed.
pub(crate) type RefreshOutcome = std::result::Result<String, RefreshFailedReason>;

/// What a 401 observer gets back from [`RefreshCoordinator::begin`].
pub(crate) enum RefreshTicket {
    /// First observer of the cycle. Performs the refresh call and must end
    /// the cycle with [`RefreshCoordinator::settle`].
    Leader,
    /// A refresh for this namespace is already in flight; the receiver
    /// resolves with its outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Single-flight refresh coordination: per namespace, at most one refresh
/// call is in flight, and every concurrent 401 observer shares its outcome.
///
/// State is owned by the client that constructed the coordinator; nothing
/// here is process-global. The map holds an entry per namespace currently
/// refreshing, and that entry's queue drains FIFO when the cycle settles.
#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    in_flight: Mutex<HashMap<TokenNamespace, Vec<oneshot::Sender<RefreshOutcome>>>>,
}

impl RefreshCoordinator {
    pub(crate) fn begin(&self, namespace: TokenNamespace) -> RefreshTicket {
        match self.lock().entry(namespace) {
            Entry::Vacant(entry) => {
                entry.insert(Vec::new());
                RefreshTicket::Leader
            }
            Entry::Occupied(mut entry) => {
                let (tx, rx) = oneshot::channel();
                entry.get_mut().push(tx);
                trace!(
                    %namespace,
                    waiters = entry.get().len(),
                    "queued behind in-flight refresh"
                );
                RefreshTicket::Waiter(rx)
            }
        }
    }

    /// Ends the cycle for `namespace`: clears the in-flight marker and
    /// resolves every queued waiter with `outcome`, in enqueue order.
    pub(crate) fn settle(&self, namespace: TokenNamespace, outcome: &RefreshOutcome) {
        let waiters = self.lock().remove(&namespace).unwrap_or_default();
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TokenNamespace, Vec<oneshot::Sender<RefreshOutcome>>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::RefreshCoordinator;
    use super::RefreshTicket;
    use crate::error::RefreshFailedReason;
    use hirelane_auth::TokenNamespace;

    #[tokio::test]
    async fn second_observer_waits_on_the_leader() {
        let coordinator = RefreshCoordinator::default();
        assert!(matches!(
            coordinator.begin(TokenNamespace::User),
            RefreshTicket::Leader
        ));
        let RefreshTicket::Waiter(rx) = coordinator.begin(TokenNamespace::User) else {
            panic!("second begin must not lead");
        };

        coordinator.settle(TokenNamespace::User, &Ok("t2".to_string()));
        assert_eq!(rx.await.unwrap(), Ok("t2".to_string()));
    }

    #[tokio::test]
    async fn settle_rejects_waiters_with_the_shared_reason() {
        let coordinator = RefreshCoordinator::default();
        let _leader = coordinator.begin(TokenNamespace::User);
        let RefreshTicket::Waiter(rx) = coordinator.begin(TokenNamespace::User) else {
            panic!("second begin must not lead");
        };

        coordinator.settle(
            TokenNamespace::User,
            &Err(RefreshFailedReason::Rejected { status: 401 }),
        );
        assert_eq!(
            rx.await.unwrap(),
            Err(RefreshFailedReason::Rejected { status: 401 })
        );
    }

    #[tokio::test]
    async fn namespaces_refresh_independently() {
        let coordinator = RefreshCoordinator::default();
        assert!(matches!(
            coordinator.begin(TokenNamespace::User),
            RefreshTicket::Leader
        ));
        // A company refresh must not queue behind the user cycle.
        assert!(matches!(
            coordinator.begin(TokenNamespace::Company),
            RefreshTicket::Leader
        ));
    }

    #[tokio::test]
    async fn cycle_restarts_after_settle() {
        let coordinator = RefreshCoordinator::default();
        let _leader = coordinator.begin(TokenNamespace::User);
        coordinator.settle(TokenNamespace::User, &Ok("t2".to_string()));
        assert!(matches!(
            coordinator.begin(TokenNamespace::User),
            RefreshTicket::Leader
        ));
    }
}
