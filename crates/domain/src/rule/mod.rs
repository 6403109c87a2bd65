//! Automation rules: condition tree → ordered actions.
//!
//! A rule targets issues, pull requests or both. When its
//! [`ConditionGroup`] matches a [`Resource`](crate::resource::Resource) the
//! [`Action`]s run in list order.

mod action;
mod condition;

pub use action::{Action, CloseReason, LockReason, MergeMethod};
pub use condition::{
    ComparisonOperator, Condition, ConditionGroup, ConditionKind, ConditionNode, GroupOperator,
    MAX_CONDITION_DEPTH,
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{OctoflowError, ValidationError};
use crate::id::RuleId;
use crate::resource::{ResourceKind, eq_ignore_case};
use crate::time::Timestamp;

/// Which resources a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Issue,
    PullRequest,
    #[default]
    Both,
}

impl ResourceType {
    #[must_use]
    pub fn matches(self, kind: ResourceKind) -> bool {
        match self {
            Self::Both => true,
            Self::Issue => kind == ResourceKind::Issue,
            Self::PullRequest => kind == ResourceKind::PullRequest,
        }
    }
}

/// A user-defined automation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub resource_type: ResourceType,
    pub conditions: ConditionGroup,
    pub actions: Vec<Action>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by: String,
    /// Lower runs first; rules without a value run after all ordered ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_order: Option<u32>,
    /// `owner/repo` allow-list. `None` (or an empty list) means every repository.
    #[serde(
        default,
        deserialize_with = "non_empty_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub repositories: Option<Vec<String>>,
}

impl AutomationRule {
    /// Create a builder for constructing an [`AutomationRule`].
    #[must_use]
    pub fn builder() -> AutomationRuleBuilder {
        AutomationRuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`OctoflowError::Validation`] when:
    /// - `name` is blank ([`ValidationError::EmptyName`])
    /// - the root group has no children ([`ValidationError::NoConditions`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    /// - the tree is nested deeper than [`MAX_CONDITION_DEPTH`]
    /// - a regex or glob does not compile
    /// - a repository entry is not `owner/repo`
    pub fn validate(&self) -> Result<(), OctoflowError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.conditions.conditions.is_empty() {
            return Err(ValidationError::NoConditions.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        if self.conditions.depth() > MAX_CONDITION_DEPTH {
            return Err(ValidationError::ConditionTreeTooDeep {
                max_depth: MAX_CONDITION_DEPTH,
            }
            .into());
        }
        for condition in self.conditions.leaves() {
            condition.kind.validate()?;
        }
        if let Some(repositories) = &self.repositories {
            for repo in repositories {
                validate_repository(repo)?;
            }
        }
        Ok(())
    }

    /// Whether this rule should be evaluated for a resource of `kind` in `owner/repo`.
    #[must_use]
    pub fn applies_to(&self, kind: ResourceKind, owner: &str, repo: &str) -> bool {
        if !self.enabled || !self.resource_type.matches(kind) {
            return false;
        }
        match &self.repositories {
            Some(list) if !list.is_empty() => {
                let full_name = format!("{owner}/{repo}");
                list.iter().any(|r| eq_ignore_case(r, &full_name))
            }
            _ => true,
        }
    }

    /// Ordering key: `run_order`, with unordered rules last.
    #[must_use]
    pub fn sort_key(&self) -> u32 {
        self.run_order.unwrap_or(u32::MAX)
    }
}

/// An empty allow-list is stored as `None`.
fn non_empty_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.filter(|list| !list.is_empty()))
}

fn validate_repository(repo: &str) -> Result<(), ValidationError> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(ValidationError::InvalidRepository(repo.to_string())),
    }
}

/// Step-by-step builder for [`AutomationRule`].
#[derive(Debug, Default)]
pub struct AutomationRuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    description: Option<String>,
    enabled: Option<bool>,
    resource_type: Option<ResourceType>,
    operator: GroupOperator,
    conditions: Vec<ConditionNode>,
    actions: Vec<Action>,
    created_at: Option<Timestamp>,
    created_by: Option<String>,
    run_order: Option<u32>,
    repositories: Option<Vec<String>>,
}

impl AutomationRuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    /// Operator of the root group (AND unless set).
    #[must_use]
    pub fn operator(mut self, operator: GroupOperator) -> Self {
        self.operator = operator;
        self
    }

    #[must_use]
    pub fn condition(mut self, node: impl Into<ConditionNode>) -> Self {
        self.conditions.push(node.into());
        self
    }

    /// Replace the whole condition tree.
    #[must_use]
    pub fn conditions(mut self, group: ConditionGroup) -> Self {
        self.operator = group.operator;
        self.conditions = group.conditions;
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    #[must_use]
    pub fn created_by(mut self, login: impl Into<String>) -> Self {
        self.created_by = Some(login.into());
        self
    }

    #[must_use]
    pub fn run_order(mut self, order: u32) -> Self {
        self.run_order = Some(order);
        self
    }

    #[must_use]
    pub fn repository(mut self, full_name: impl Into<String>) -> Self {
        self.repositories
            .get_or_insert_with(Vec::new)
            .push(full_name.into());
        self
    }

    /// Consume the builder, validate, and return an [`AutomationRule`].
    ///
    /// # Errors
    ///
    /// Returns [`OctoflowError::Validation`] if required fields are missing or invalid.
    pub fn build(self) -> Result<AutomationRule, OctoflowError> {
        let created_at = self.created_at.unwrap_or_else(crate::time::now);
        let rule = AutomationRule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            enabled: self.enabled.unwrap_or(true),
            resource_type: self.resource_type.unwrap_or_default(),
            conditions: ConditionGroup::new(self.operator, self.conditions),
            actions: self.actions,
            created_at,
            updated_at: created_at,
            created_by: self.created_by.unwrap_or_default(),
            run_order: self.run_order,
            repositories: self.repositories,
        };
        rule.validate()?;
        Ok(rule)
    }
}

/// Payload for creating a rule (form submission or template).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRule {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
    pub conditions: ConditionGroup,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub run_order: Option<u32>,
    #[serde(default, deserialize_with = "non_empty_list")]
    pub repositories: Option<Vec<String>>,
    #[serde(default)]
    pub created_by: String,
}

impl NewRule {
    /// Turn the payload into a validated rule stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns [`OctoflowError::Validation`] when the resulting rule is invalid.
    pub fn into_rule(self, now: Timestamp) -> Result<AutomationRule, OctoflowError> {
        let mut builder = AutomationRule::builder()
            .name(self.name)
            .conditions(self.conditions)
            .created_at(now)
            .created_by(self.created_by);
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(enabled) = self.enabled {
            builder = builder.enabled(enabled);
        }
        if let Some(resource_type) = self.resource_type {
            builder = builder.resource_type(resource_type);
        }
        if let Some(order) = self.run_order {
            builder = builder.run_order(order);
        }
        for repo in self.repositories.into_iter().flatten() {
            builder = builder.repository(repo);
        }
        for action in self.actions {
            builder = builder.action(action);
        }
        builder.build()
    }
}

/// Partial update of a rule. Absent fields are left untouched.
///
/// The doubly optional fields distinguish "leave as is" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
    #[serde(default)]
    pub conditions: Option<ConditionGroup>,
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
    #[serde(default, with = "double_option")]
    pub run_order: Option<Option<u32>>,
    #[serde(default, with = "double_option")]
    pub repositories: Option<Option<Vec<String>>>,
}

impl RuleUpdate {
    /// Apply the update to a copy of `rule`, bump `updated_at` and re-validate.
    ///
    /// # Errors
    ///
    /// Returns [`OctoflowError::Validation`] when the updated rule is invalid.
    pub fn apply_to(
        self,
        rule: &AutomationRule,
        now: Timestamp,
    ) -> Result<AutomationRule, OctoflowError> {
        let mut updated = rule.clone();
        if let Some(name) = self.name {
            updated.name = name;
        }
        if let Some(description) = self.description {
            updated.description = description;
        }
        if let Some(enabled) = self.enabled {
            updated.enabled = enabled;
        }
        if let Some(resource_type) = self.resource_type {
            updated.resource_type = resource_type;
        }
        if let Some(conditions) = self.conditions {
            updated.conditions = conditions;
        }
        if let Some(actions) = self.actions {
            updated.actions = actions;
        }
        if let Some(run_order) = self.run_order {
            updated.run_order = run_order;
        }
        if let Some(repositories) = self.repositories {
            updated.repositories = repositories.filter(|list| !list.is_empty());
        }
        updated.updated_at = now;
        updated.validate()?;
        Ok(updated)
    }
}

/// `null` → `Some(None)`, missing → `None` (via `#[serde(default)]`).
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::option_option)]
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    #[allow(clippy::option_option)]
    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_bug() -> ConditionKind {
        ConditionKind::HasLabel {
            label: "bug".to_string(),
        }
    }

    fn add_triage() -> Action {
        Action::AddLabel {
            label: "triage".to_string(),
        }
    }

    fn valid_rule() -> AutomationRule {
        AutomationRule::builder()
            .name("Triage bugs")
            .condition(label_bug())
            .action(add_triage())
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_valid_rule_when_required_fields_provided() {
        let rule = valid_rule();
        assert_eq!(rule.name, "Triage bugs");
        assert!(rule.enabled);
        assert_eq!(rule.resource_type, ResourceType::Both);
        assert_eq!(rule.conditions.operator, GroupOperator::And);
        assert_eq!(rule.created_at, rule.updated_at);
        assert!(rule.run_order.is_none());
    }

    #[test]
    fn should_return_validation_error_when_name_is_blank() {
        let result = AutomationRule::builder()
            .name("   ")
            .condition(label_bug())
            .action(add_triage())
            .build();
        assert!(matches!(
            result,
            Err(OctoflowError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_no_conditions() {
        let result = AutomationRule::builder()
            .name("Empty")
            .action(add_triage())
            .build();
        assert!(matches!(
            result,
            Err(OctoflowError::Validation(ValidationError::NoConditions))
        ));
    }

    #[test]
    fn should_return_validation_error_when_no_actions() {
        let result = AutomationRule::builder()
            .name("Nothing to do")
            .condition(label_bug())
            .build();
        assert!(matches!(
            result,
            Err(OctoflowError::Validation(ValidationError::NoActions))
        ));
    }

    #[test]
    fn should_reject_tree_deeper_than_limit() {
        let mut group = ConditionGroup::all(vec![label_bug().into()]);
        for _ in 0..MAX_CONDITION_DEPTH {
            group = ConditionGroup::all(vec![group.into()]);
        }
        let result = AutomationRule::builder()
            .name("Deep")
            .conditions(group)
            .action(add_triage())
            .build();
        assert!(matches!(
            result,
            Err(OctoflowError::Validation(
                ValidationError::ConditionTreeTooDeep { .. }
            ))
        ));
    }

    #[test]
    fn should_reject_malformed_repository_entry() {
        let result = AutomationRule::builder()
            .name("Scoped")
            .condition(label_bug())
            .action(add_triage())
            .repository("just-a-name")
            .build();
        assert!(matches!(
            result,
            Err(OctoflowError::Validation(
                ValidationError::InvalidRepository(_)
            ))
        ));
    }

    #[test]
    fn should_apply_only_to_matching_resource_type() {
        let mut rule = valid_rule();
        rule.resource_type = ResourceType::PullRequest;
        assert!(rule.applies_to(ResourceKind::PullRequest, "o", "r"));
        assert!(!rule.applies_to(ResourceKind::Issue, "o", "r"));
    }

    #[test]
    fn should_not_apply_when_disabled() {
        let mut rule = valid_rule();
        rule.enabled = false;
        assert!(!rule.applies_to(ResourceKind::Issue, "o", "r"));
    }

    #[test]
    fn should_respect_repository_allow_list() {
        let mut rule = valid_rule();
        rule.repositories = Some(vec!["Octo/Hello-World".to_string()]);
        assert!(rule.applies_to(ResourceKind::Issue, "octo", "hello-world"));
        assert!(!rule.applies_to(ResourceKind::Issue, "octo", "other"));
    }

    #[test]
    fn should_treat_empty_repository_list_as_every_repository() {
        let payload: NewRule = serde_json::from_value(serde_json::json!({
            "name": "Everywhere",
            "conditions": {"operator": "AND", "conditions": [{"type": "has_label", "label": "bug"}]},
            "actions": [{"type": "add_label", "label": "triage"}],
            "repositories": []
        }))
        .unwrap();
        let created = payload.into_rule(crate::time::now()).unwrap();
        assert_eq!(created.repositories, None);
        assert!(created.applies_to(ResourceKind::Issue, "octo", "site"));

        let scoped = RuleUpdate {
            repositories: Some(Some(vec!["octo/other".to_string()])),
            ..RuleUpdate::default()
        }
        .apply_to(&created, crate::time::now())
        .unwrap();
        assert!(!scoped.applies_to(ResourceKind::Issue, "octo", "site"));

        let update: RuleUpdate =
            serde_json::from_value(serde_json::json!({"repositories": []})).unwrap();
        let updated = update.apply_to(&scoped, crate::time::now()).unwrap();
        assert_eq!(updated.repositories, None);
        assert!(updated.applies_to(ResourceKind::Issue, "octo", "site"));

        let mut json = serde_json::to_value(&created).unwrap();
        json["repositories"] = serde_json::json!([]);
        let imported: AutomationRule = serde_json::from_value(json).unwrap();
        assert_eq!(imported.repositories, None);

        let mut literal = created;
        literal.repositories = Some(vec![]);
        assert!(literal.applies_to(ResourceKind::Issue, "octo", "site"));
    }

    #[test]
    fn should_sort_unordered_rules_last() {
        let mut ordered = valid_rule();
        ordered.run_order = Some(5);
        let unordered = valid_rule();
        assert!(ordered.sort_key() < unordered.sort_key());
    }

    #[test]
    fn should_apply_partial_update_and_bump_timestamp() {
        let rule = valid_rule();
        let later = rule.updated_at + chrono::Duration::minutes(5);
        let update = RuleUpdate {
            enabled: Some(false),
            run_order: Some(Some(3)),
            ..RuleUpdate::default()
        };
        let updated = update.apply_to(&rule, later).unwrap();
        assert!(!updated.enabled);
        assert_eq!(updated.run_order, Some(3));
        assert_eq!(updated.name, rule.name);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.created_at, rule.created_at);
    }

    #[test]
    fn should_distinguish_null_from_missing_in_update() {
        let update: RuleUpdate =
            serde_json::from_value(serde_json::json!({"description": null})).unwrap();
        assert_eq!(update.description, Some(None));
        assert_eq!(update.run_order, None);
    }

    #[test]
    fn should_reject_update_that_breaks_invariants() {
        let rule = valid_rule();
        let update = RuleUpdate {
            actions: Some(vec![]),
            ..RuleUpdate::default()
        };
        assert!(update.apply_to(&rule, crate::time::now()).is_err());
    }

    #[test]
    fn should_build_rule_from_new_rule_payload() {
        let payload: NewRule = serde_json::from_value(serde_json::json!({
            "name": "Label docs",
            "resource_type": "pull_request",
            "conditions": {
                "operator": "OR",
                "conditions": [{"type": "file_path_matches", "pattern": "docs/**"}]
            },
            "actions": [{"type": "add_label", "label": "docs"}],
            "repositories": ["octo/site"],
            "created_by": "octocat"
        }))
        .unwrap();
        let rule = payload.into_rule(crate::time::now()).unwrap();
        assert_eq!(rule.resource_type, ResourceType::PullRequest);
        assert_eq!(rule.conditions.operator, GroupOperator::Or);
        assert_eq!(rule.repositories, Some(vec!["octo/site".to_string()]));
        assert_eq!(rule.created_by, "octocat");
    }

    #[test]
    fn should_roundtrip_rule_through_serde_json() {
        let rule = valid_rule();
        let json = serde_json::to_string(&rule).unwrap();
        let parsed: AutomationRule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rule);
    }
}
