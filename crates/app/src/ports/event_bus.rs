//! Rule-change bus port: notifies subscribers after the rule list changes.

use std::future::Future;

use serde::Serialize;

use octoflow_domain::error::OctoflowError;
use octoflow_domain::id::RuleId;

/// A committed change to the stored rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleChange {
    Created { rule_id: RuleId },
    Updated { rule_id: RuleId },
    Deleted { rule_id: RuleId },
    Imported { count: usize, replaced: bool },
}

impl RuleChange {
    /// Short event name, used as the SSE `event:` field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
            Self::Imported { .. } => "imported",
        }
    }
}

/// Publishes [`RuleChange`]s to interested subscribers.
pub trait RuleEventPublisher {
    /// Publish a change to all current subscribers.
    fn publish(&self, change: RuleChange)
    -> impl Future<Output = Result<(), OctoflowError>> + Send;
}

impl<T: RuleEventPublisher + Send + Sync> RuleEventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        change: RuleChange,
    ) -> impl Future<Output = Result<(), OctoflowError>> + Send {
        (**self).publish(change)
    }
}
