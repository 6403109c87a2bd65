//! Stub ports and request helpers shared by the handler tests.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;

use octoflow_app::event_bus::InProcessRuleBus;
use octoflow_app::ports::{GitHubClient, IssueRef, RuleRepository};
use octoflow_app::services::automation_service::AutomationService;
use octoflow_app::services::rule_service::RuleService;
use octoflow_domain::error::{GitHubError, OctoflowError};
use octoflow_domain::resource::{
    Label, PullRequestDetails, Resource, ResourceKind, ResourceState, User,
};
use octoflow_domain::rule::{
    Action, AutomationRule, CloseReason, ConditionKind, LockReason, MergeMethod,
};

#[derive(Default)]
pub(crate) struct StubRuleRepo {
    pub rules: Mutex<Vec<AutomationRule>>,
}

impl RuleRepository for StubRuleRepo {
    async fn load_all(&self) -> Result<Vec<AutomationRule>, OctoflowError> {
        Ok(self.rules.lock().unwrap().clone())
    }

    async fn save_all(&self, rules: &[AutomationRule]) -> Result<(), OctoflowError> {
        *self.rules.lock().unwrap() = rules.to_vec();
        Ok(())
    }
}

/// Serves issue #1 and pull request #2 of any repository and records
/// mutations as `op(detail)`.
#[derive(Default)]
pub(crate) struct StubGitHub {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl StubGitHub {
    fn record(&self, call: String) -> Result<(), GitHubError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

fn not_found(target: IssueRef<'_>) -> GitHubError {
    GitHubError::new(Some(404), format!("{target} not found"))
}

pub(crate) fn issue(number: u64) -> Resource {
    let now = octoflow_domain::time::now();
    Resource {
        kind: ResourceKind::Issue,
        number,
        title: "App crashes on start".to_string(),
        body: None,
        state: ResourceState::Open,
        author: Some(User::new("octocat")),
        labels: vec![Label::new("bug")],
        assignees: vec![],
        created_at: now,
        updated_at: now,
        pull_request: None,
    }
}

impl GitHubClient for StubGitHub {
    async fn get_issue(&self, target: IssueRef<'_>) -> Result<Resource, GitHubError> {
        match target.number {
            1 => Ok(issue(1)),
            _ => Err(not_found(target)),
        }
    }

    async fn get_pull_request(&self, target: IssueRef<'_>) -> Result<Resource, GitHubError> {
        match target.number {
            2 => Ok(Resource {
                kind: ResourceKind::PullRequest,
                title: "WIP: settings".to_string(),
                pull_request: Some(PullRequestDetails {
                    draft: false,
                    base_branch: "main".to_string(),
                    head_branch: "settings".to_string(),
                    changed_files: vec![],
                    reviews: vec![],
                    merged: false,
                }),
                ..issue(2)
            }),
            _ => Err(not_found(target)),
        }
    }

    async fn add_labels(&self, _target: IssueRef<'_>, labels: &[String]) -> Result<(), GitHubError> {
        self.record(format!("add_labels({})", labels.join(",")))
    }

    async fn remove_label(&self, _target: IssueRef<'_>, label: &str) -> Result<(), GitHubError> {
        self.record(format!("remove_label({label})"))
    }

    async fn add_assignees(
        &self,
        _target: IssueRef<'_>,
        assignees: &[String],
    ) -> Result<(), GitHubError> {
        self.record(format!("add_assignees({})", assignees.join(",")))
    }

    async fn remove_assignees(
        &self,
        _target: IssueRef<'_>,
        assignees: &[String],
    ) -> Result<(), GitHubError> {
        self.record(format!("remove_assignees({})", assignees.join(",")))
    }

    async fn request_reviewers(
        &self,
        _target: IssueRef<'_>,
        reviewers: &[String],
    ) -> Result<(), GitHubError> {
        self.record(format!("request_reviewers({})", reviewers.join(",")))
    }

    async fn create_comment(&self, _target: IssueRef<'_>, body: &str) -> Result<(), GitHubError> {
        self.record(format!("create_comment({body})"))
    }

    async fn update_issue_state(
        &self,
        _target: IssueRef<'_>,
        state: ResourceState,
        _reason: Option<CloseReason>,
    ) -> Result<(), GitHubError> {
        self.record(format!("update_issue_state({state:?})"))
    }

    async fn set_milestone(
        &self,
        _target: IssueRef<'_>,
        milestone: Option<u64>,
    ) -> Result<(), GitHubError> {
        self.record(format!("set_milestone({milestone:?})"))
    }

    async fn lock(
        &self,
        _target: IssueRef<'_>,
        _reason: Option<LockReason>,
    ) -> Result<(), GitHubError> {
        self.record("lock()".to_string())
    }

    async fn unlock(&self, _target: IssueRef<'_>) -> Result<(), GitHubError> {
        self.record("unlock()".to_string())
    }

    async fn convert_to_draft(&self, _target: IssueRef<'_>) -> Result<(), GitHubError> {
        self.record("convert_to_draft()".to_string())
    }

    async fn mark_ready_for_review(&self, _target: IssueRef<'_>) -> Result<(), GitHubError> {
        self.record("mark_ready_for_review()".to_string())
    }

    async fn merge(
        &self,
        _target: IssueRef<'_>,
        method: MergeMethod,
        _commit_title: Option<&str>,
        _commit_message: Option<&str>,
    ) -> Result<(), GitHubError> {
        self.record(format!("merge({})", method.as_str()))
    }
}

pub(crate) type TestState =
    crate::state::AppState<Arc<StubRuleRepo>, Arc<InProcessRuleBus>, StubGitHub>;

/// Handles kept by a test to inspect what the handlers did.
pub(crate) struct Probes {
    pub repo: Arc<StubRuleRepo>,
    pub bus: Arc<InProcessRuleBus>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

pub(crate) fn test_state(rules: Vec<AutomationRule>) -> (TestState, Probes) {
    let repo = Arc::new(StubRuleRepo {
        rules: Mutex::new(rules),
    });
    let bus = Arc::new(InProcessRuleBus::new(16));
    let github = StubGitHub::default();
    let probes = Probes {
        repo: Arc::clone(&repo),
        bus: Arc::clone(&bus),
        calls: Arc::clone(&github.calls),
    };
    let state = crate::state::AppState::new(
        RuleService::new(Arc::clone(&repo), Arc::clone(&bus)),
        AutomationService::new(repo, github),
        bus,
    );
    (state, probes)
}

/// Rule labelling every issue that already carries `bug`.
pub(crate) fn bug_rule(name: &str) -> AutomationRule {
    AutomationRule::builder()
        .name(name)
        .condition(ConditionKind::HasLabel {
            label: "bug".to_string(),
        })
        .action(Action::AddLabel {
            label: "triage".to_string(),
        })
        .build()
        .unwrap()
}

pub(crate) fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub(crate) fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub(crate) async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
