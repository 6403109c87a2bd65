//! In-process rule-change bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use octoflow_domain::error::OctoflowError;

use crate::ports::{RuleChange, RuleEventPublisher};

/// In-process rule-change bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the change is simply dropped).
pub struct InProcessRuleBus {
    sender: broadcast::Sender<RuleChange>,
}

impl InProcessRuleBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to rule changes.
    ///
    /// Returns a receiver that will get all changes published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RuleChange> {
        self.sender.subscribe()
    }
}

impl RuleEventPublisher for InProcessRuleBus {
    fn publish(
        &self,
        change: RuleChange,
    ) -> impl Future<Output = Result<(), OctoflowError>> + Send {
        // send only fails without receivers
        let _ = self.sender.send(change);
        async { Ok(()) }
    }
}
