//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`OctoflowError`] via `#[from]`.

/// Top-level error shared by every layer of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum OctoflowError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("github error")]
    GitHub(#[from] GitHubError),

    #[error("mark-as-duplicate failed")]
    DuplicateSaga(#[from] DuplicateSagaError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Broken domain invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("a rule needs at least one condition")]
    NoConditions,

    #[error("a rule needs at least one action")]
    NoActions,

    #[error("invalid rule id: {0}")]
    InvalidRuleId(String),

    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("condition tree is deeper than {max_depth} levels")]
    ConditionTreeTooDeep { max_depth: usize },

    #[error("repository must be in `owner/repo` form, got {0:?}")]
    InvalidRepository(String),

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("action `{action}` only applies to pull requests")]
    PullRequestOnlyAction { action: &'static str },

    #[error("invalid rules document: {0}")]
    InvalidDocument(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A GitHub API call failed.
///
/// `status` is the HTTP status reported by GitHub when the request reached
/// the API at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct GitHubError {
    pub status: Option<u16>,
    pub message: String,
}

impl std::fmt::Display for GitHubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(code) => write!(f, "GitHub API error (HTTP {code}): {}", self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubError {
    #[must_use]
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// `true` when GitHub answered `404 Not Found`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

/// Partial-failure states of the two-step mark-as-duplicate sequence
/// (comment, then close).
///
/// The comment is never rolled back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DuplicateSagaError {
    #[error("posting the duplicate comment failed")]
    CommentFailed(#[source] GitHubError),

    #[error("closing as duplicate failed after the comment was posted")]
    CloseFailed {
        comment_posted: bool,
        #[source]
        source: GitHubError,
    },
}

impl DuplicateSagaError {
    /// `true` when the resource was left commented but still open.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            Self::CloseFailed {
                comment_posted: true,
                ..
            }
        )
    }
}

/// Render an error followed by its `source()` chain, joined with `: `.
#[must_use]
pub fn display_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
