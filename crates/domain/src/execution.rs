//! Execution results: what happened when a rule ran against a resource.
//!
//! Results are returned to the caller and never persisted.

use serde::{Deserialize, Serialize};

use crate::id::RuleId;
use crate::rule::Action;
use crate::time::Timestamp;

/// Outcome of a single action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// The action's `type` tag, e.g. `add_label`.
    pub action_type: String,
    pub success: bool,
    /// Error text when `success` is `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionOutcome {
    #[must_use]
    pub fn succeeded(action: &Action) -> Self {
        Self {
            action_type: action.kind_name().to_string(),
            success: true,
            message: None,
        }
    }

    #[must_use]
    pub fn failed(action: &Action, message: impl Into<String>) -> Self {
        Self {
            action_type: action.kind_name().to_string(),
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Result of evaluating (and possibly executing) one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleExecutionResult {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub matched: bool,
    /// Empty when the rule did not match.
    pub actions_executed: Vec<ActionOutcome>,
    pub timestamp: Timestamp,
}

impl RuleExecutionResult {
    #[must_use]
    pub fn unmatched(rule_id: RuleId, rule_name: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            rule_id,
            rule_name: rule_name.into(),
            matched: false,
            actions_executed: Vec::new(),
            timestamp,
        }
    }

    /// `true` when the rule matched and every action succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.matched && self.actions_executed.iter().all(|o| o.success)
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.actions_executed.iter().filter(|o| !o.success).count()
    }
}
