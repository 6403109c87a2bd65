//! Built-in rule templates.
//!
//! A template is a ready-made [`NewRule`] covering a common workflow. Users
//! instantiate one and then tweak the resulting rule like any other.

use serde::Serialize;

use crate::error::ValidationError;
use crate::resource::ReviewState;
use crate::rule::{
    Action, CloseReason, ComparisonOperator, ConditionGroup, ConditionKind, MergeMethod, NewRule,
    ResourceType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blueprint {
    LabelBugs,
    WelcomeFirstIssue,
    CloseStaleIssues,
    AutoMergeApproved,
    DraftWip,
}

/// A named, built-in rule blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub resource_type: ResourceType,
    #[serde(skip)]
    blueprint: Blueprint,
}

const TEMPLATES: [Template; 5] = [
    Template {
        key: "label-bugs",
        name: "Label bug reports",
        description: "Adds the `bug` label to issues whose title or body mentions a bug or crash.",
        resource_type: ResourceType::Issue,
        blueprint: Blueprint::LabelBugs,
    },
    Template {
        key: "welcome-first-issue",
        name: "Welcome new issues",
        description: "Thanks the author of a freshly opened, unlabelled issue and marks it for triage.",
        resource_type: ResourceType::Issue,
        blueprint: Blueprint::WelcomeFirstIssue,
    },
    Template {
        key: "close-stale-issues",
        name: "Close stale issues",
        description: "Closes issues without activity for 60 days unless they are pinned.",
        resource_type: ResourceType::Issue,
        blueprint: Blueprint::CloseStaleIssues,
    },
    Template {
        key: "auto-merge-approved",
        name: "Auto-merge approved pull requests",
        description: "Squash-merges non-draft pull requests approved by reviewers and labelled `automerge`.",
        resource_type: ResourceType::PullRequest,
        blueprint: Blueprint::AutoMergeApproved,
    },
    Template {
        key: "draft-wip",
        name: "Draft work in progress",
        description: "Converts pull requests titled `WIP` back to draft.",
        resource_type: ResourceType::PullRequest,
        blueprint: Blueprint::DraftWip,
    },
];

/// All built-in templates, in display order.
#[must_use]
pub fn templates() -> &'static [Template] {
    &TEMPLATES
}

/// Look a template up by its key.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownTemplate`] for an unknown key.
pub fn find_template(key: &str) -> Result<Template, ValidationError> {
    TEMPLATES
        .iter()
        .find(|t| t.key == key)
        .copied()
        .ok_or_else(|| ValidationError::UnknownTemplate(key.to_string()))
}

fn contains(value: &str) -> ConditionKind {
    ConditionKind::TitleContains {
        value: value.to_string(),
        case_sensitive: false,
    }
}

fn has_label(label: &str) -> ConditionKind {
    ConditionKind::HasLabel {
        label: label.to_string(),
    }
}

impl Template {
    /// Build the rule payload for this template.
    #[must_use]
    pub fn instantiate(&self, created_by: impl Into<String>) -> NewRule {
        let (conditions, actions) = match self.blueprint {
            Blueprint::LabelBugs => (
                ConditionGroup::any(vec![
                    ConditionKind::TitleMatches {
                        pattern: r"\b(bug|crash(es|ed)?)\b".to_string(),
                        flags: "i".to_string(),
                    }
                    .into(),
                    ConditionKind::BodyContains {
                        value: "steps to reproduce".to_string(),
                        case_sensitive: false,
                    }
                    .into(),
                ]),
                vec![Action::AddLabel {
                    label: "bug".to_string(),
                }],
            ),
            Blueprint::WelcomeFirstIssue => (
                ConditionGroup::all(vec![
                    ConditionKind::CreatedDaysAgo {
                        days: 1,
                        operator: ComparisonOperator::Lt,
                    }
                    .into(),
                    crate::rule::Condition::from(has_label("needs-triage"))
                        .negated()
                        .into(),
                ]),
                vec![
                    Action::Comment {
                        body: "Thanks for opening this issue! A maintainer will take a look soon."
                            .to_string(),
                    },
                    Action::AddLabel {
                        label: "needs-triage".to_string(),
                    },
                ],
            ),
            Blueprint::CloseStaleIssues => (
                ConditionGroup::all(vec![
                    ConditionKind::UpdatedDaysAgo {
                        days: 60,
                        operator: ComparisonOperator::Gte,
                    }
                    .into(),
                    crate::rule::Condition::from(has_label("pinned"))
                        .negated()
                        .into(),
                ]),
                vec![
                    Action::Comment {
                        body: "Closing this issue after 60 days without activity. Feel free to reopen it."
                            .to_string(),
                    },
                    Action::AddLabel {
                        label: "stale".to_string(),
                    },
                    Action::Close {
                        reason: Some(CloseReason::NotPlanned),
                    },
                ],
            ),
            Blueprint::AutoMergeApproved => (
                ConditionGroup::all(vec![
                    ConditionKind::ReviewState {
                        state: ReviewState::Approved,
                    }
                    .into(),
                    ConditionKind::IsDraft { value: false }.into(),
                    has_label("automerge").into(),
                ]),
                vec![Action::Merge {
                    method: Some(MergeMethod::Squash),
                    commit_title: None,
                    commit_message: None,
                }],
            ),
            Blueprint::DraftWip => (
                ConditionGroup::all(vec![
                    ConditionGroup::any(vec![
                        contains("wip").into(),
                        contains("work in progress").into(),
                    ])
                    .into(),
                    ConditionKind::IsDraft { value: false }.into(),
                ]),
                vec![
                    Action::ConvertToDraft,
                    Action::AddLabel {
                        label: "work-in-progress".to_string(),
                    },
                ],
            ),
        };

        NewRule {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            enabled: Some(true),
            resource_type: Some(self.resource_type),
            conditions,
            actions,
            run_order: None,
            repositories: None,
            created_by: created_by.into(),
        }
    }
}
