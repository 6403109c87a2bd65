//! Rule action service: translates one [`Action`] into GitHub API calls.

use std::slice;

use octoflow_domain::error::{DuplicateSagaError, GitHubError, OctoflowError, ValidationError};
use octoflow_domain::resource::{Resource, ResourceState};
use octoflow_domain::rule::{Action, CloseReason};

use crate::ports::{GitHubClient, IssueRef};

/// Executes rule actions against GitHub.
pub struct RuleActionService<G> {
    github: G,
}

impl<G> RuleActionService<G>
where
    G: GitHubClient + Send + Sync,
{
    /// Create a new service backed by the given GitHub client.
    pub fn new(github: G) -> Self {
        Self { github }
    }

    /// The underlying client, for reads outside of action execution.
    pub fn github(&self) -> &G {
        &self.github
    }

    /// Execute `action` on `resource` in `owner/repo`.
    ///
    /// # Errors
    ///
    /// - [`OctoflowError::Validation`] for a pull-request-only action on an issue
    /// - [`OctoflowError::GitHub`] when the API call fails (except a 404 from
    ///   removing a label that is not attached, which is ignored)
    /// - [`OctoflowError::DuplicateSaga`] when marking as duplicate fails
    #[tracing::instrument(skip(self, resource), fields(action = %action, number = resource.number))]
    pub async fn execute_action(
        &self,
        action: &Action,
        resource: &Resource,
        owner: &str,
        repo: &str,
    ) -> Result<(), OctoflowError> {
        if action.requires_pull_request() && !resource.is_pull_request() {
            return Err(ValidationError::PullRequestOnlyAction {
                action: action.kind_name(),
            }
            .into());
        }

        let target = IssueRef::new(owner, repo, resource.number);
        match action {
            Action::AddLabel { label } => {
                self.github
                    .add_labels(target, slice::from_ref(label))
                    .await?;
            }
            Action::RemoveLabel { label } => self.remove_label(target, label).await?,
            Action::Assign { username } => {
                self.github
                    .add_assignees(target, slice::from_ref(username))
                    .await?;
            }
            Action::Unassign { username } => {
                self.github
                    .remove_assignees(target, slice::from_ref(username))
                    .await?;
            }
            Action::RequestReview { reviewer } => {
                self.github
                    .request_reviewers(target, slice::from_ref(reviewer))
                    .await?;
            }
            Action::Comment { body } => self.github.create_comment(target, body).await?,
            Action::Close { reason } => {
                self.github
                    .update_issue_state(target, ResourceState::Closed, *reason)
                    .await?;
            }
            Action::Reopen => {
                self.github
                    .update_issue_state(target, ResourceState::Open, None)
                    .await?;
            }
            Action::SetMilestone { milestone } => {
                self.github.set_milestone(target, Some(*milestone)).await?;
            }
            Action::RemoveMilestone => self.github.set_milestone(target, None).await?,
            Action::Lock { reason } => self.github.lock(target, *reason).await?,
            Action::Unlock => self.github.unlock(target).await?,
            Action::MarkAsDuplicate { original } => {
                self.mark_as_duplicate(target, *original).await?;
            }
            Action::ConvertToDraft => self.github.convert_to_draft(target).await?,
            Action::MarkReadyForReview => self.github.mark_ready_for_review(target).await?,
            Action::Merge {
                method,
                commit_title,
                commit_message,
            } => {
                self.github
                    .merge(
                        target,
                        method.unwrap_or_default(),
                        commit_title.as_deref(),
                        commit_message.as_deref(),
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Remove a label, treating "not attached" (404) as success.
    async fn remove_label(&self, target: IssueRef<'_>, label: &str) -> Result<(), GitHubError> {
        match self.github.remove_label(target, label).await {
            Err(err) if err.is_not_found() => {
                tracing::debug!(%target, label, "label not attached, nothing to remove");
                Ok(())
            }
            other => other,
        }
    }

    /// Comment `Duplicate of #original`, then close as not planned.
    ///
    /// The two steps are not atomic. When closing fails the comment stays
    /// and the error reports `comment_posted: true`.
    async fn mark_as_duplicate(
        &self,
        target: IssueRef<'_>,
        original: u64,
    ) -> Result<(), DuplicateSagaError> {
        let body = format!("Duplicate of #{original}");
        self.github
            .create_comment(target, &body)
            .await
            .map_err(DuplicateSagaError::CommentFailed)?;

        self.github
            .update_issue_state(target, ResourceState::Closed, Some(CloseReason::NotPlanned))
            .await
            .map_err(|source| {
                tracing::warn!(%target, original, error = %source, "duplicate comment posted but closing failed");
                DuplicateSagaError::CloseFailed {
                    comment_posted: true,
                    source,
                }
            })
    }
}
