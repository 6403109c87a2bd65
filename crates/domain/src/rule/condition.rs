//! Conditions: leaf predicates and the AND/OR groups that combine them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::resource::ReviewState;

/// Maximum nesting of [`ConditionGroup`]s accepted in a rule.
///
/// The root group counts as level 1.
pub const MAX_CONDITION_DEPTH: usize = 32;

/// How the children of a [`ConditionGroup`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupOperator {
    #[default]
    And,
    Or,
}

/// An AND/OR combinator over conditions and nested groups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub operator: GroupOperator,
    pub conditions: Vec<ConditionNode>,
}

impl ConditionGroup {
    #[must_use]
    pub fn new(operator: GroupOperator, conditions: Vec<ConditionNode>) -> Self {
        Self {
            operator,
            conditions,
        }
    }

    #[must_use]
    pub fn all(conditions: Vec<ConditionNode>) -> Self {
        Self::new(GroupOperator::And, conditions)
    }

    #[must_use]
    pub fn any(conditions: Vec<ConditionNode>) -> Self {
        Self::new(GroupOperator::Or, conditions)
    }

    /// Nesting depth of this tree; a group with only leaf conditions is `1`.
    ///
    /// Iterative so that hostile input cannot exhaust the stack here.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((group, level)) = stack.pop() {
            max = max.max(level);
            for node in &group.conditions {
                if let ConditionNode::Group(child) = node {
                    stack.push((child, level + 1));
                }
            }
        }
        max
    }

    /// Iterate over every leaf condition in the tree, depth-first.
    pub fn leaves(&self) -> impl Iterator<Item = &Condition> {
        let mut stack: Vec<&ConditionNode> = self.conditions.iter().rev().collect();
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                match node {
                    ConditionNode::Condition(c) => return Some(c),
                    ConditionNode::Group(g) => stack.extend(g.conditions.iter().rev()),
                }
            }
            None
        })
    }
}

/// A child of a [`ConditionGroup`]: either a leaf or another group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Group(ConditionGroup),
    Condition(Condition),
}

impl From<Condition> for ConditionNode {
    fn from(value: Condition) -> Self {
        Self::Condition(value)
    }
}

impl From<ConditionKind> for ConditionNode {
    fn from(value: ConditionKind) -> Self {
        Self::Condition(value.into())
    }
}

impl From<ConditionGroup> for ConditionNode {
    fn from(value: ConditionGroup) -> Self {
        Self::Group(value)
    }
}

/// A leaf predicate, optionally negated after evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(flatten)]
    pub kind: ConditionKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negate: bool,
}

impl Condition {
    /// Return the same condition with its result inverted.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }
}

impl From<ConditionKind> for Condition {
    fn from(kind: ConditionKind) -> Self {
        Self {
            kind,
            negate: false,
        }
    }
}

/// The predicate evaluated by a [`Condition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionKind {
    /// Title contains `value` as a substring.
    TitleContains {
        value: String,
        #[serde(default)]
        case_sensitive: bool,
    },
    /// Body contains `value` as a substring. A missing body never matches.
    BodyContains {
        value: String,
        #[serde(default)]
        case_sensitive: bool,
    },
    /// Title matches a regular expression.
    TitleMatches {
        pattern: String,
        /// JavaScript-style flags (`i`, `m`, `s`, `x`).
        #[serde(default)]
        flags: String,
    },
    /// Body matches a regular expression.
    BodyMatches {
        pattern: String,
        #[serde(default)]
        flags: String,
    },
    HasLabel {
        label: String,
    },
    AuthorIs {
        username: String,
    },
    AssigneeIs {
        username: String,
    },
    /// Any changed file matches. Glob by default, `re:` prefix for a regex.
    FilePathMatches {
        pattern: String,
    },
    BaseBranchMatches {
        pattern: String,
    },
    HeadBranchMatches {
        pattern: String,
    },
    IsDraft {
        value: bool,
    },
    /// The majority verdict, counting each reviewer's latest review once.
    ReviewState {
        state: ReviewState,
    },
    CreatedDaysAgo {
        days: u32,
        operator: ComparisonOperator,
    },
    UpdatedDaysAgo {
        days: u32,
        operator: ComparisonOperator,
    },
    /// A condition type this build does not know. Always evaluates to `false`.
    #[serde(other)]
    Unknown,
}

impl ConditionKind {
    /// The serialized `type` tag.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TitleContains { .. } => "title_contains",
            Self::BodyContains { .. } => "body_contains",
            Self::TitleMatches { .. } => "title_matches",
            Self::BodyMatches { .. } => "body_matches",
            Self::HasLabel { .. } => "has_label",
            Self::AuthorIs { .. } => "author_is",
            Self::AssigneeIs { .. } => "assignee_is",
            Self::FilePathMatches { .. } => "file_path_matches",
            Self::BaseBranchMatches { .. } => "base_branch_matches",
            Self::HeadBranchMatches { .. } => "head_branch_matches",
            Self::IsDraft { .. } => "is_draft",
            Self::ReviewState { .. } => "review_state",
            Self::CreatedDaysAgo { .. } => "created_days_ago",
            Self::UpdatedDaysAgo { .. } => "updated_days_ago",
            Self::Unknown => "unknown",
        }
    }

    /// Check that any pattern carried by this condition compiles.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] for a bad regex or glob.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::TitleMatches { pattern, flags } | Self::BodyMatches { pattern, flags } => {
                crate::matching::compile_regex(pattern, flags)
                    .map(|_| ())
                    .map_err(|reason| ValidationError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason,
                    })
            }
            Self::FilePathMatches { pattern }
            | Self::BaseBranchMatches { pattern }
            | Self::HeadBranchMatches { pattern } => crate::matching::PathPattern::parse(pattern)
                .map(|_| ())
                .map_err(|reason| ValidationError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason,
                }),
            _ => Ok(()),
        }
    }
}

/// Relational operator for the elapsed-days conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = ">", alias = "gt")]
    Gt,
    #[serde(rename = ">=", alias = "gte")]
    Gte,
    #[serde(rename = "<", alias = "lt")]
    Lt,
    #[serde(rename = "<=", alias = "lte")]
    Lte,
    #[serde(rename = "=", alias = "eq", alias = "==")]
    Eq,
}

impl ComparisonOperator {
    /// Compare `actual` against `expected` with this operator.
    #[must_use]
    pub fn compare(self, actual: i64, expected: i64) -> bool {
        match self {
            Self::Gt => actual > expected,
            Self::Gte => actual >= expected,
            Self::Lt => actual < expected,
            Self::Lte => actual <= expected,
            Self::Eq => actual == expected,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Eq => "=",
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negate {
            f.write_str("not ")?;
        }
        match &self.kind {
            ConditionKind::TitleContains { value, .. } => write!(f, "title_contains({value})"),
            ConditionKind::BodyContains { value, .. } => write!(f, "body_contains({value})"),
            ConditionKind::TitleMatches { pattern, flags } => {
                write!(f, "title_matches(/{pattern}/{flags})")
            }
            ConditionKind::BodyMatches { pattern, flags } => {
                write!(f, "body_matches(/{pattern}/{flags})")
            }
            ConditionKind::HasLabel { label } => write!(f, "has_label({label})"),
            ConditionKind::AuthorIs { username } => write!(f, "author_is({username})"),
            ConditionKind::AssigneeIs { username } => write!(f, "assignee_is({username})"),
            ConditionKind::FilePathMatches { pattern } => write!(f, "file_path_matches({pattern})"),
            ConditionKind::BaseBranchMatches { pattern } => {
                write!(f, "base_branch_matches({pattern})")
            }
            ConditionKind::HeadBranchMatches { pattern } => {
                write!(f, "head_branch_matches({pattern})")
            }
            ConditionKind::IsDraft { value } => write!(f, "is_draft({value})"),
            ConditionKind::ReviewState { state } => write!(f, "review_state({state:?})"),
            ConditionKind::CreatedDaysAgo { days, operator } => {
                write!(f, "created_days_ago({operator} {days})")
            }
            ConditionKind::UpdatedDaysAgo { days, operator } => {
                write!(f, "updated_days_ago({operator} {days})")
            }
            ConditionKind::Unknown => f.write_str("unknown"),
        }
    }
}
