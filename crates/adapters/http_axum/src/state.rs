//! Shared application state for axum handlers.

use std::sync::Arc;

use octoflow_app::event_bus::InProcessRuleBus;
use octoflow_app::ports::{GitHubClient, RuleEventPublisher, RuleRepository};
use octoflow_app::services::automation_service::AutomationService;
use octoflow_app::services::rule_service::RuleService;

/// Application state shared across all axum handlers.
///
/// Generic over the rule repository, the rule-change publisher and the
/// GitHub client to avoid dynamic dispatch. `Clone` is implemented manually
/// so the underlying types do not need to be `Clone`; only the `Arc`
/// wrappers are cloned.
pub struct AppState<R, P, G> {
    /// Rule CRUD, templates and import/export.
    pub rule_service: Arc<RuleService<R, P>>,
    /// Runs rules against issues and pull requests.
    pub automation_service: Arc<AutomationService<R, G>>,
    /// Broadcast channel the SSE stream subscribes to.
    pub rule_bus: Arc<InProcessRuleBus>,
}

impl<R, P, G> Clone for AppState<R, P, G> {
    fn clone(&self) -> Self {
        Self {
            rule_service: Arc::clone(&self.rule_service),
            automation_service: Arc::clone(&self.automation_service),
            rule_bus: Arc::clone(&self.rule_bus),
        }
    }
}

impl<R, P, G> AppState<R, P, G>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        rule_service: RuleService<R, P>,
        automation_service: AutomationService<R, G>,
        rule_bus: Arc<InProcessRuleBus>,
    ) -> Self {
        Self {
            rule_service: Arc::new(rule_service),
            automation_service: Arc::new(automation_service),
            rule_bus,
        }
    }
}
