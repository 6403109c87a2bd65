//! GitHub port: reads and mutates issues and pull requests.

use std::fmt;
use std::future::Future;

use octoflow_domain::error::GitHubError;
use octoflow_domain::resource::{Resource, ResourceState};
use octoflow_domain::rule::{CloseReason, LockReason, MergeMethod};

/// Address of an issue or pull request: `owner/repo#number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueRef<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub number: u64,
}

impl<'a> IssueRef<'a> {
    #[must_use]
    pub fn new(owner: &'a str, repo: &'a str, number: u64) -> Self {
        Self {
            owner,
            repo,
            number,
        }
    }
}

impl fmt::Display for IssueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// GitHub REST/GraphQL operations needed by the automation engine.
///
/// Pull requests share the issue number space, so issue-level operations
/// (labels, assignees, comments, state, milestone, lock) work on both.
pub trait GitHubClient {
    /// Fetch an issue snapshot.
    fn get_issue(
        &self,
        target: IssueRef<'_>,
    ) -> impl Future<Output = Result<Resource, GitHubError>> + Send;

    /// Fetch a pull request snapshot, including changed files and reviews.
    fn get_pull_request(
        &self,
        target: IssueRef<'_>,
    ) -> impl Future<Output = Result<Resource, GitHubError>> + Send;

    fn add_labels(
        &self,
        target: IssueRef<'_>,
        labels: &[String],
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    /// Remove one label. GitHub answers 404 when the label is not attached.
    fn remove_label(
        &self,
        target: IssueRef<'_>,
        label: &str,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    fn add_assignees(
        &self,
        target: IssueRef<'_>,
        assignees: &[String],
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    fn remove_assignees(
        &self,
        target: IssueRef<'_>,
        assignees: &[String],
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    fn request_reviewers(
        &self,
        target: IssueRef<'_>,
        reviewers: &[String],
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    fn create_comment(
        &self,
        target: IssueRef<'_>,
        body: &str,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    /// Open or close; `reason` only applies when closing.
    fn update_issue_state(
        &self,
        target: IssueRef<'_>,
        state: ResourceState,
        reason: Option<CloseReason>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    /// Set (`Some`) or clear (`None`) the milestone.
    fn set_milestone(
        &self,
        target: IssueRef<'_>,
        milestone: Option<u64>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    fn lock(
        &self,
        target: IssueRef<'_>,
        reason: Option<LockReason>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    fn unlock(&self, target: IssueRef<'_>)
    -> impl Future<Output = Result<(), GitHubError>> + Send;

    fn convert_to_draft(
        &self,
        target: IssueRef<'_>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    fn mark_ready_for_review(
        &self,
        target: IssueRef<'_>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    fn merge(
        &self,
        target: IssueRef<'_>,
        method: MergeMethod,
        commit_title: Option<&str>,
        commit_message: Option<&str>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;
}
