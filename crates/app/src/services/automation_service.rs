//! Automation service: runs every applicable rule against one issue or
//! pull request.
//!
//! The resource is fetched once. Rules are evaluated in `run_order` against
//! that snapshot, and the actions of matching rules run one after another.
//! A failing action is recorded in the result and never aborts the run.

use octoflow_domain::error::{OctoflowError, display_chain};
use octoflow_domain::execution::{ActionOutcome, RuleExecutionResult};
use octoflow_domain::matching::RuleMatcher;
use octoflow_domain::resource::Resource;
use octoflow_domain::rule::AutomationRule;
use octoflow_domain::time;

use crate::ports::{GitHubClient, IssueRef, RuleRepository};
use crate::services::action_service::RuleActionService;

/// Matches rules against resources and dispatches their actions.
pub struct AutomationService<R, G> {
    rules: R,
    actions: RuleActionService<G>,
}

impl<R, G> AutomationService<R, G>
where
    R: RuleRepository + Send + Sync,
    G: GitHubClient + Send + Sync,
{
    /// Create a new service.
    pub fn new(rules: R, github: G) -> Self {
        Self {
            rules,
            actions: RuleActionService::new(github),
        }
    }

    /// Run the rules against issue `owner/repo#number`.
    ///
    /// When `rules` is `None` the stored rules are used.
    ///
    /// # Errors
    ///
    /// Returns [`OctoflowError::GitHub`] when the issue cannot be fetched, or a
    /// storage error when the stored rules cannot be loaded. Action failures
    /// are reported inside the results instead.
    #[tracing::instrument(skip(self, rules))]
    pub async fn execute_rules_for_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        rules: Option<Vec<AutomationRule>>,
    ) -> Result<Vec<RuleExecutionResult>, OctoflowError> {
        let resource = self
            .actions
            .github()
            .get_issue(IssueRef::new(owner, repo, number))
            .await?;
        self.execute_rules(&resource, owner, repo, rules).await
    }

    /// Run the rules against pull request `owner/repo#number`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute_rules_for_issue`].
    #[tracing::instrument(skip(self, rules))]
    pub async fn execute_rules_for_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        rules: Option<Vec<AutomationRule>>,
    ) -> Result<Vec<RuleExecutionResult>, OctoflowError> {
        let resource = self
            .actions
            .github()
            .get_pull_request(IssueRef::new(owner, repo, number))
            .await?;
        self.execute_rules(&resource, owner, repo, rules).await
    }

    /// Run the rules against an already fetched resource.
    ///
    /// Disabled rules, rules for the other resource kind and rules scoped to
    /// other repositories are skipped and produce no result.
    ///
    /// # Errors
    ///
    /// Returns a storage error when `rules` is `None` and loading fails.
    pub async fn execute_rules(
        &self,
        resource: &Resource,
        owner: &str,
        repo: &str,
        rules: Option<Vec<AutomationRule>>,
    ) -> Result<Vec<RuleExecutionResult>, OctoflowError> {
        let rules = match rules {
            Some(rules) => rules,
            None => self.rules.load_all().await?,
        };

        let mut applicable: Vec<AutomationRule> = rules
            .into_iter()
            .filter(|rule| rule.applies_to(resource.kind, owner, repo))
            .collect();
        applicable.sort_by_key(AutomationRule::sort_key);

        let matcher = RuleMatcher::new(time::now());
        let mut results = Vec::with_capacity(applicable.len());
        for rule in &applicable {
            results.push(self.run_rule(&matcher, rule, resource, owner, repo).await);
        }
        Ok(results)
    }

    async fn run_rule(
        &self,
        matcher: &RuleMatcher,
        rule: &AutomationRule,
        resource: &Resource,
        owner: &str,
        repo: &str,
    ) -> RuleExecutionResult {
        let matched = matcher.evaluate_group(&rule.conditions, resource);
        tracing::info!(
            rule_id = %rule.id,
            rule_name = %rule.name,
            resource = %resource.kind,
            number = resource.number,
            matched,
            "evaluated rule"
        );
        if !matched {
            return RuleExecutionResult::unmatched(rule.id, rule.name.clone(), matcher.now());
        }

        let mut outcomes = Vec::with_capacity(rule.actions.len());
        for action in &rule.actions {
            let outcome = match self
                .actions
                .execute_action(action, resource, owner, repo)
                .await
            {
                Ok(()) => ActionOutcome::succeeded(action),
                Err(err) => {
                    let message = display_chain(&err);
                    tracing::warn!(rule_id = %rule.id, %action, error = %message, "action failed");
                    ActionOutcome::failed(action, message)
                }
            };
            outcomes.push(outcome);
        }

        RuleExecutionResult {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            matched: true,
            actions_executed: outcomes,
            timestamp: time::now(),
        }
    }
}
