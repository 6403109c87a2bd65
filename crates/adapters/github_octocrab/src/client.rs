//! [`GitHubClient`] implementation on top of an [`Octocrab`] instance.

use octocrab::Octocrab;
use serde::de::DeserializeOwned;

use octoflow_app::ports::{GitHubClient, IssueRef};
use octoflow_domain::error::GitHubError;
use octoflow_domain::resource::{Resource, ResourceState};
use octoflow_domain::rule::{CloseReason, LockReason, MergeMethod};

use crate::error::{from_graphql_errors, from_octocrab};
use crate::wire::{
    AssigneesBody, CommentBody, FileDto, IssueDto, LabelsBody, LockBody, MergeBody,
    MilestoneBody, PullRequestDto, ReviewDto, ReviewersBody, StateBody,
};

const PAGE_SIZE: usize = 100;

const CONVERT_TO_DRAFT: &str = "mutation($id: ID!) { convertPullRequestToDraft(input: {pullRequestId: $id}) { pullRequest { isDraft } } }";
const MARK_READY_FOR_REVIEW: &str = "mutation($id: ID!) { markPullRequestReadyForReview(input: {pullRequestId: $id}) { pullRequest { isDraft } } }";

/// Connection settings for the GitHub API.
#[derive(Debug, Default, Clone)]
pub struct Config {
    /// Personal access or installation token. Without one, requests are anonymous.
    pub token: Option<String>,
    /// Override of the API root, e.g. for GitHub Enterprise Server.
    pub api_url: Option<String>,
}

impl Config {
    /// Build a client from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] when the API URL is invalid or the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<OctocrabGitHubClient, GitHubError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = self.token {
            builder = builder.personal_token(token);
        }
        if let Some(url) = self.api_url.as_deref() {
            builder = builder.base_uri(url).map_err(from_octocrab)?;
        }
        let octocrab = builder.build().map_err(from_octocrab)?;
        Ok(OctocrabGitHubClient::new(octocrab))
    }
}

/// GitHub client backed by octocrab.
#[derive(Clone)]
pub struct OctocrabGitHubClient {
    octocrab: Octocrab,
}

impl OctocrabGitHubClient {
    #[must_use]
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Authenticate with a personal access token against github.com.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] when the HTTP client cannot be created.
    pub fn from_token(token: impl Into<String>) -> Result<Self, GitHubError> {
        Config {
            token: Some(token.into()),
            api_url: None,
        }
        .build()
    }

    fn issue_route(target: IssueRef<'_>, suffix: &str) -> String {
        format!(
            "/repos/{}/{}/issues/{}{suffix}",
            target.owner, target.repo, target.number
        )
    }

    fn pull_route(target: IssueRef<'_>, suffix: &str) -> String {
        format!(
            "/repos/{}/{}/pulls/{}{suffix}",
            target.owner, target.repo, target.number
        )
    }

    async fn get<T: DeserializeOwned>(&self, route: &str) -> Result<T, GitHubError> {
        self.octocrab
            .get(route, None::<&()>)
            .await
            .map_err(from_octocrab)
    }

    /// Fetch every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(&self, route: &str) -> Result<Vec<T>, GitHubError> {
        let mut items = Vec::new();
        for page in 1u32.. {
            let batch: Vec<T> = self
                .get(&format!("{route}?per_page={PAGE_SIZE}&page={page}"))
                .await?;
            let last = batch.len() < PAGE_SIZE;
            tracing::trace!(route, page, count = batch.len(), "fetched page");
            items.extend(batch);
            if last {
                break;
            }
        }
        Ok(items)
    }

    async fn post<B: serde::Serialize + ?Sized>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<(), GitHubError> {
        let _: serde_json::Value = self
            .octocrab
            .post(route, Some(body))
            .await
            .map_err(from_octocrab)?;
        Ok(())
    }

    async fn patch<B: serde::Serialize + ?Sized>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<(), GitHubError> {
        let _: serde_json::Value = self
            .octocrab
            .patch(route, Some(body))
            .await
            .map_err(from_octocrab)?;
        Ok(())
    }

    /// For endpoints answering `204 No Content`.
    async fn put_empty<B: serde::Serialize + ?Sized>(
        &self,
        route: &str,
        body: Option<&B>,
    ) -> Result<(), GitHubError> {
        let response = self.octocrab._put(route, body).await.map_err(from_octocrab)?;
        octocrab::map_github_error(response)
            .await
            .map_err(from_octocrab)?;
        Ok(())
    }

    async fn delete_with_body<B: serde::Serialize + ?Sized>(
        &self,
        route: &str,
        body: Option<&B>,
    ) -> Result<(), GitHubError> {
        let response = self
            .octocrab
            ._delete(route, body)
            .await
            .map_err(from_octocrab)?;
        octocrab::map_github_error(response)
            .await
            .map_err(from_octocrab)?;
        Ok(())
    }

    async fn graphql_mutation(&self, query: &str, node_id: &str) -> Result<(), GitHubError> {
        tracing::debug!(node_id, "sending GraphQL mutation");
        let response: serde_json::Value = self
            .octocrab
            .graphql(&serde_json::json!({
                "query": query,
                "variables": { "id": node_id },
            }))
            .await
            .map_err(from_octocrab)?;
        match from_graphql_errors(&response) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn pull_request_node_id(&self, target: IssueRef<'_>) -> Result<String, GitHubError> {
        let pr: PullRequestDto = self.get(&Self::pull_route(target, "")).await?;
        Ok(pr.node_id)
    }
}

impl std::fmt::Debug for OctocrabGitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabGitHubClient").finish_non_exhaustive()
    }
}

impl GitHubClient for OctocrabGitHubClient {
    async fn get_issue(&self, target: IssueRef<'_>) -> Result<Resource, GitHubError> {
        let issue: IssueDto = self.get(&Self::issue_route(target, "")).await?;
        Ok(issue.into_resource())
    }

    async fn get_pull_request(&self, target: IssueRef<'_>) -> Result<Resource, GitHubError> {
        let pr: PullRequestDto = self.get(&Self::pull_route(target, "")).await?;
        let files: Vec<FileDto> = self.get_all(&Self::pull_route(target, "/files")).await?;
        let reviews: Vec<ReviewDto> = self.get_all(&Self::pull_route(target, "/reviews")).await?;
        tracing::debug!(
            %target,
            files = files.len(),
            reviews = reviews.len(),
            "fetched pull request"
        );
        Ok(pr.into_resource(files, reviews))
    }

    async fn add_labels(&self, target: IssueRef<'_>, labels: &[String]) -> Result<(), GitHubError> {
        self.post(&Self::issue_route(target, "/labels"), &LabelsBody { labels })
            .await
    }

    async fn remove_label(&self, target: IssueRef<'_>, label: &str) -> Result<(), GitHubError> {
        // the typed handler percent-encodes the label name
        self.octocrab
            .issues(target.owner, target.repo)
            .remove_label(target.number, label)
            .await
            .map_err(from_octocrab)?;
        Ok(())
    }

    async fn add_assignees(
        &self,
        target: IssueRef<'_>,
        assignees: &[String],
    ) -> Result<(), GitHubError> {
        self.post(
            &Self::issue_route(target, "/assignees"),
            &AssigneesBody { assignees },
        )
        .await
    }

    async fn remove_assignees(
        &self,
        target: IssueRef<'_>,
        assignees: &[String],
    ) -> Result<(), GitHubError> {
        self.delete_with_body(
            &Self::issue_route(target, "/assignees"),
            Some(&AssigneesBody { assignees }),
        )
        .await
    }

    async fn request_reviewers(
        &self,
        target: IssueRef<'_>,
        reviewers: &[String],
    ) -> Result<(), GitHubError> {
        self.post(
            &Self::pull_route(target, "/requested_reviewers"),
            &ReviewersBody { reviewers },
        )
        .await
    }

    async fn create_comment(&self, target: IssueRef<'_>, body: &str) -> Result<(), GitHubError> {
        self.post(&Self::issue_route(target, "/comments"), &CommentBody { body })
            .await
    }

    async fn update_issue_state(
        &self,
        target: IssueRef<'_>,
        state: ResourceState,
        reason: Option<CloseReason>,
    ) -> Result<(), GitHubError> {
        let body = match state {
            ResourceState::Open => StateBody {
                state: "open",
                state_reason: None,
            },
            ResourceState::Closed => StateBody {
                state: "closed",
                state_reason: reason.map(CloseReason::as_str),
            },
        };
        self.patch(&Self::issue_route(target, ""), &body).await
    }

    async fn set_milestone(
        &self,
        target: IssueRef<'_>,
        milestone: Option<u64>,
    ) -> Result<(), GitHubError> {
        self.patch(&Self::issue_route(target, ""), &MilestoneBody { milestone })
            .await
    }

    async fn lock(
        &self,
        target: IssueRef<'_>,
        reason: Option<LockReason>,
    ) -> Result<(), GitHubError> {
        let body = LockBody {
            lock_reason: reason.map(LockReason::as_str),
        };
        self.put_empty(&Self::issue_route(target, "/lock"), Some(&body))
            .await
    }

    async fn unlock(&self, target: IssueRef<'_>) -> Result<(), GitHubError> {
        self.delete_with_body(&Self::issue_route(target, "/lock"), None::<&()>)
            .await
    }

    async fn convert_to_draft(&self, target: IssueRef<'_>) -> Result<(), GitHubError> {
        let node_id = self.pull_request_node_id(target).await?;
        self.graphql_mutation(CONVERT_TO_DRAFT, &node_id).await
    }

    async fn mark_ready_for_review(&self, target: IssueRef<'_>) -> Result<(), GitHubError> {
        let node_id = self.pull_request_node_id(target).await?;
        self.graphql_mutation(MARK_READY_FOR_REVIEW, &node_id).await
    }

    async fn merge(
        &self,
        target: IssueRef<'_>,
        method: MergeMethod,
        commit_title: Option<&str>,
        commit_message: Option<&str>,
    ) -> Result<(), GitHubError> {
        let body = MergeBody {
            merge_method: method.as_str(),
            commit_title,
            commit_message,
        };
        let _: serde_json::Value = self
            .octocrab
            .put(Self::pull_route(target, "/merge"), Some(&body))
            .await
            .map_err(from_octocrab)?;
        Ok(())
    }
}
