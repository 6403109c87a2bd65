//! Resource: a point-in-time snapshot of a GitHub issue or pull request.
//!
//! The automation engine fetches a resource once per run and evaluates every
//! rule against that same snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Whether a [`Resource`] is an issue or a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Issue,
    PullRequest,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => f.write_str("issue"),
            Self::PullRequest => f.write_str("pull_request"),
        }
    }
}

/// Open/closed state shared by issues and pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    Open,
    Closed,
}

/// A GitHub account reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

impl User {
    #[must_use]
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

/// A label attached to an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// State of a single pull request review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

impl ReviewState {
    /// Reviews that express a verdict (and therefore take part in the vote).
    #[must_use]
    pub fn is_verdict(self) -> bool {
        matches!(self, Self::Approved | Self::ChangesRequested | Self::Dismissed)
    }
}

/// A submitted review on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer: String,
    pub state: ReviewState,
    #[serde(default)]
    pub submitted_at: Option<Timestamp>,
}

/// Pull-request-only fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDetails {
    pub draft: bool,
    pub base_branch: String,
    pub head_branch: String,
    #[serde(default)]
    pub changed_files: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub merged: bool,
}

/// Snapshot of an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: ResourceState,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<User>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Present only when `kind` is [`ResourceKind::PullRequest`].
    #[serde(default)]
    pub pull_request: Option<PullRequestDetails>,
}

/// Unicode-aware case-insensitive equality, matching how the text
/// conditions fold case.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

impl Resource {
    /// `true` when a label with `name` is attached (case-insensitive, like GitHub).
    #[must_use]
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| eq_ignore_case(&l.name, name))
    }

    /// `true` when `login` is among the assignees (case-insensitive).
    #[must_use]
    pub fn is_assigned_to(&self, login: &str) -> bool {
        self.assignees
            .iter()
            .any(|u| eq_ignore_case(&u.login, login))
    }

    /// Login of the author, if GitHub reported one (deleted accounts have none).
    #[must_use]
    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().map(|u| u.login.as_str())
    }

    #[must_use]
    pub fn is_pull_request(&self) -> bool {
        self.kind == ResourceKind::PullRequest
    }
}
