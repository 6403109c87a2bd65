//! REST payloads, reduced to the fields the rule engine reads.

use serde::{Deserialize, Serialize};

use octoflow_domain::resource::{
    Label, PullRequestDetails, Resource, ResourceKind, ResourceState, Review, ReviewState, User,
};
use octoflow_domain::time::Timestamp;

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    pub login: String,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        User::new(dto.login)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelDto {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum StateDto {
    Open,
    Closed,
}

impl From<StateDto> for ResourceState {
    fn from(dto: StateDto) -> Self {
        match dto {
            StateDto::Open => ResourceState::Open,
            StateDto::Closed => ResourceState::Closed,
        }
    }
}

/// `GET /repos/{owner}/{repo}/issues/{number}`
#[derive(Debug, Deserialize)]
pub(crate) struct IssueDto {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: StateDto,
    #[serde(default)]
    pub user: Option<UserDto>,
    #[serde(default)]
    pub labels: Vec<LabelDto>,
    #[serde(default)]
    pub assignees: Vec<UserDto>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl IssueDto {
    pub fn into_resource(self) -> Resource {
        Resource {
            kind: ResourceKind::Issue,
            number: self.number,
            title: self.title,
            body: self.body,
            state: self.state.into(),
            author: self.user.map(User::from),
            labels: self.labels.into_iter().map(|l| Label::new(l.name)).collect(),
            assignees: self.assignees.into_iter().map(User::from).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            pull_request: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BranchDto {
    #[serde(rename = "ref")]
    pub name: String,
}

/// `GET /repos/{owner}/{repo}/pulls/{number}`
#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestDto {
    pub node_id: String,
    #[serde(flatten)]
    pub issue: IssueDto,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub merged: bool,
    pub base: BranchDto,
    pub head: BranchDto,
}

/// `GET /repos/{owner}/{repo}/pulls/{number}/files`
#[derive(Debug, Deserialize)]
pub(crate) struct FileDto {
    pub filename: String,
}

/// `GET /repos/{owner}/{repo}/pulls/{number}/reviews`
#[derive(Debug, Deserialize)]
pub(crate) struct ReviewDto {
    #[serde(default)]
    pub user: Option<UserDto>,
    pub state: ReviewState,
    #[serde(default)]
    pub submitted_at: Option<Timestamp>,
}

impl PullRequestDto {
    pub fn into_resource(self, files: Vec<FileDto>, reviews: Vec<ReviewDto>) -> Resource {
        let details = PullRequestDetails {
            draft: self.draft,
            base_branch: self.base.name,
            head_branch: self.head.name,
            changed_files: files.into_iter().map(|f| f.filename).collect(),
            reviews: reviews
                .into_iter()
                .filter_map(|r| {
                    // reviews from deleted accounts have no user and cannot be attributed
                    let reviewer = r.user?.login;
                    Some(Review {
                        reviewer,
                        state: r.state,
                        submitted_at: r.submitted_at,
                    })
                })
                .collect(),
            merged: self.merged,
        };
        Resource {
            kind: ResourceKind::PullRequest,
            pull_request: Some(details),
            ..self.issue.into_resource()
        }
    }
}

// ── Request bodies ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LabelsBody<'a> {
    pub labels: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct AssigneesBody<'a> {
    pub assignees: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewersBody<'a> {
    pub reviewers: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentBody<'a> {
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct StateBody {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<&'static str>,
}

/// `milestone: null` clears the milestone, so the field is always sent.
#[derive(Debug, Serialize)]
pub(crate) struct MilestoneBody {
    pub milestone: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LockBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_reason: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MergeBody<'a> {
    pub merge_method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<&'a str>,
}
