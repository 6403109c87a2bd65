//! Action: the mutation performed on a resource when a rule matches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why an issue is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Completed,
    NotPlanned,
}

impl CloseReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NotPlanned => "not_planned",
        }
    }
}

/// Reason shown on a locked conversation. Values are GitHub's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockReason {
    #[serde(rename = "off-topic")]
    OffTopic,
    #[serde(rename = "too heated")]
    TooHeated,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "spam")]
    Spam,
}

impl LockReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OffTopic => "off-topic",
            Self::TooHeated => "too heated",
            Self::Resolved => "resolved",
            Self::Spam => "spam",
        }
    }
}

/// How a pull request gets merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    #[default]
    Merge,
    Squash,
    Rebase,
}

impl MergeMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Squash => "squash",
            Self::Rebase => "rebase",
        }
    }
}

/// A mutation executed against the GitHub API for the matched resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    AddLabel {
        label: String,
    },
    /// Removing a label that is not present is not an error.
    RemoveLabel {
        label: String,
    },
    Assign {
        username: String,
    },
    Unassign {
        username: String,
    },
    RequestReview {
        reviewer: String,
    },
    Comment {
        body: String,
    },
    Close {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<CloseReason>,
    },
    Reopen,
    SetMilestone {
        /// Milestone number within the repository.
        milestone: u64,
    },
    RemoveMilestone,
    Lock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<LockReason>,
    },
    Unlock,
    /// Comment `Duplicate of #original`, then close as not planned.
    MarkAsDuplicate {
        original: u64,
    },
    ConvertToDraft,
    MarkReadyForReview,
    Merge {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<MergeMethod>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commit_title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commit_message: Option<String>,
    },
}

impl Action {
    /// The serialized `type` tag, used in execution results.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::AddLabel { .. } => "add_label",
            Self::RemoveLabel { .. } => "remove_label",
            Self::Assign { .. } => "assign",
            Self::Unassign { .. } => "unassign",
            Self::RequestReview { .. } => "request_review",
            Self::Comment { .. } => "comment",
            Self::Close { .. } => "close",
            Self::Reopen => "reopen",
            Self::SetMilestone { .. } => "set_milestone",
            Self::RemoveMilestone => "remove_milestone",
            Self::Lock { .. } => "lock",
            Self::Unlock => "unlock",
            Self::MarkAsDuplicate { .. } => "mark_as_duplicate",
            Self::ConvertToDraft => "convert_to_draft",
            Self::MarkReadyForReview => "mark_ready_for_review",
            Self::Merge { .. } => "merge",
        }
    }

    /// Actions that only make sense on a pull request.
    #[must_use]
    pub fn requires_pull_request(&self) -> bool {
        matches!(
            self,
            Self::RequestReview { .. }
                | Self::ConvertToDraft
                | Self::MarkReadyForReview
                | Self::Merge { .. }
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddLabel { label } => write!(f, "add_label({label})"),
            Self::RemoveLabel { label } => write!(f, "remove_label({label})"),
            Self::Assign { username } => write!(f, "assign({username})"),
            Self::Unassign { username } => write!(f, "unassign({username})"),
            Self::RequestReview { reviewer } => write!(f, "request_review({reviewer})"),
            Self::Comment { .. } => f.write_str("comment"),
            Self::Close { reason } => match reason {
                Some(reason) => write!(f, "close({})", reason.as_str()),
                None => f.write_str("close"),
            },
            Self::SetMilestone { milestone } => write!(f, "set_milestone({milestone})"),
            Self::Lock { reason: Some(reason) } => write!(f, "lock({})", reason.as_str()),
            Self::MarkAsDuplicate { original } => write!(f, "mark_as_duplicate(#{original})"),
            Self::Merge { method, .. } => {
                write!(f, "merge({})", method.unwrap_or_default().as_str())
            }
            other => f.write_str(other.kind_name()),
        }
    }
}
