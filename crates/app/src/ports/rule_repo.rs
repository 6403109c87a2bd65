//! Rule repository port: persistence for the rule list.

use std::future::Future;

use octoflow_domain::error::OctoflowError;
use octoflow_domain::rule::AutomationRule;

/// Stores the complete list of [`AutomationRule`]s as one document.
///
/// There is no per-rule write: callers read the whole list, modify it and
/// save it back.
pub trait RuleRepository {
    /// Load every stored rule, in stored order.
    ///
    /// A missing document yields an empty list.
    fn load_all(&self) -> impl Future<Output = Result<Vec<AutomationRule>, OctoflowError>> + Send;

    /// Replace the stored list with `rules`.
    fn save_all(
        &self,
        rules: &[AutomationRule],
    ) -> impl Future<Output = Result<(), OctoflowError>> + Send;
}

impl<T: RuleRepository + Send + Sync> RuleRepository for std::sync::Arc<T> {
    fn load_all(&self) -> impl Future<Output = Result<Vec<AutomationRule>, OctoflowError>> + Send {
        (**self).load_all()
    }

    fn save_all(
        &self,
        rules: &[AutomationRule],
    ) -> impl Future<Output = Result<(), OctoflowError>> + Send {
        (**self).save_all(rules)
    }
}
