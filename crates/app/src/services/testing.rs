//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use octoflow_domain::error::{GitHubError, OctoflowError};
use octoflow_domain::resource::{Label, PullRequestDetails, Resource, ResourceKind, ResourceState, User};
use octoflow_domain::rule::{AutomationRule, CloseReason, LockReason, MergeMethod};

use crate::ports::{GitHubClient, IssueRef, RuleChange, RuleEventPublisher, RuleRepository};

// ── Rule repository ────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryRuleRepo {
    pub rules: Mutex<Vec<AutomationRule>>,
    pub saves: Mutex<usize>,
}

impl InMemoryRuleRepo {
    pub fn with(rules: Vec<AutomationRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
            saves: Mutex::new(0),
        }
    }
}

impl RuleRepository for InMemoryRuleRepo {
    fn load_all(&self) -> impl Future<Output = Result<Vec<AutomationRule>, OctoflowError>> + Send {
        let rules = self.rules.lock().unwrap().clone();
        async { Ok(rules) }
    }

    fn save_all(
        &self,
        rules: &[AutomationRule],
    ) -> impl Future<Output = Result<(), OctoflowError>> + Send {
        *self.rules.lock().unwrap() = rules.to_vec();
        *self.saves.lock().unwrap() += 1;
        async { Ok(()) }
    }
}

// ── Publisher ──────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct RecordingPublisher {
    pub changes: Mutex<Vec<RuleChange>>,
}

impl RuleEventPublisher for RecordingPublisher {
    fn publish(
        &self,
        change: RuleChange,
    ) -> impl Future<Output = Result<(), OctoflowError>> + Send {
        self.changes.lock().unwrap().push(change);
        async { Ok(()) }
    }
}

// ── GitHub ─────────────────────────────────────────────────────────

/// Records every mutating call as `op(detail)` and fails the operations
/// registered with [`FakeGitHub::fail`].
#[derive(Default)]
pub(crate) struct FakeGitHub {
    pub issue: Mutex<Option<Resource>>,
    pub pull_request: Mutex<Option<Resource>>,
    pub calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, GitHubError>>,
}

impl FakeGitHub {
    pub fn with_issue(issue: Resource) -> Self {
        let fake = Self::default();
        *fake.issue.lock().unwrap() = Some(issue);
        fake
    }

    pub fn with_pull_request(pr: Resource) -> Self {
        let fake = Self::default();
        *fake.pull_request.lock().unwrap() = Some(pr);
        fake
    }

    pub fn fail(&self, op: &'static str, error: GitHubError) {
        self.failures.lock().unwrap().insert(op, error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call(&self, op: &'static str, detail: String) -> Result<(), GitHubError> {
        self.calls.lock().unwrap().push(format!("{op}({detail})"));
        match self.failures.lock().unwrap().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn fetch(slot: &Mutex<Option<Resource>>, target: IssueRef<'_>) -> Result<Resource, GitHubError> {
        slot.lock()
            .unwrap()
            .clone()
            .ok_or_else(|| GitHubError::new(Some(404), format!("{target} not found")))
    }
}

impl GitHubClient for FakeGitHub {
    fn get_issue(
        &self,
        target: IssueRef<'_>,
    ) -> impl Future<Output = Result<Resource, GitHubError>> + Send {
        let result = Self::fetch(&self.issue, target);
        async { result }
    }

    fn get_pull_request(
        &self,
        target: IssueRef<'_>,
    ) -> impl Future<Output = Result<Resource, GitHubError>> + Send {
        let result = Self::fetch(&self.pull_request, target);
        async { result }
    }

    fn add_labels(
        &self,
        _target: IssueRef<'_>,
        labels: &[String],
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("add_labels", labels.join(","));
        async { result }
    }

    fn remove_label(
        &self,
        _target: IssueRef<'_>,
        label: &str,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("remove_label", label.to_string());
        async { result }
    }

    fn add_assignees(
        &self,
        _target: IssueRef<'_>,
        assignees: &[String],
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("add_assignees", assignees.join(","));
        async { result }
    }

    fn remove_assignees(
        &self,
        _target: IssueRef<'_>,
        assignees: &[String],
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("remove_assignees", assignees.join(","));
        async { result }
    }

    fn request_reviewers(
        &self,
        _target: IssueRef<'_>,
        reviewers: &[String],
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("request_reviewers", reviewers.join(","));
        async { result }
    }

    fn create_comment(
        &self,
        _target: IssueRef<'_>,
        body: &str,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("create_comment", body.to_string());
        async { result }
    }

    fn update_issue_state(
        &self,
        _target: IssueRef<'_>,
        state: ResourceState,
        reason: Option<CloseReason>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let state = match state {
            ResourceState::Open => "open",
            ResourceState::Closed => "closed",
        };
        let detail = match reason {
            Some(reason) => format!("{state},{}", reason.as_str()),
            None => state.to_string(),
        };
        let result = self.call("update_issue_state", detail);
        async { result }
    }

    fn set_milestone(
        &self,
        _target: IssueRef<'_>,
        milestone: Option<u64>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let detail = milestone.map_or_else(|| "none".to_string(), |m| m.to_string());
        let result = self.call("set_milestone", detail);
        async { result }
    }

    fn lock(
        &self,
        _target: IssueRef<'_>,
        reason: Option<LockReason>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("lock", reason.map(LockReason::as_str).unwrap_or_default().to_string());
        async { result }
    }

    fn unlock(&self, _target: IssueRef<'_>) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("unlock", String::new());
        async { result }
    }

    fn convert_to_draft(
        &self,
        _target: IssueRef<'_>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("convert_to_draft", String::new());
        async { result }
    }

    fn mark_ready_for_review(
        &self,
        _target: IssueRef<'_>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let result = self.call("mark_ready_for_review", String::new());
        async { result }
    }

    fn merge(
        &self,
        _target: IssueRef<'_>,
        method: MergeMethod,
        commit_title: Option<&str>,
        _commit_message: Option<&str>,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send {
        let detail = match commit_title {
            Some(title) => format!("{},{title}", method.as_str()),
            None => method.as_str().to_string(),
        };
        let result = self.call("merge", detail);
        async { result }
    }
}

// ── Fixtures ───────────────────────────────────────────────────────

pub(crate) fn issue(number: u64) -> Resource {
    let now = octoflow_domain::time::now();
    Resource {
        kind: ResourceKind::Issue,
        number,
        title: "Crash when opening settings".to_string(),
        body: Some("It panics.".to_string()),
        state: ResourceState::Open,
        author: Some(User::new("octocat")),
        labels: vec![Label::new("bug")],
        assignees: vec![],
        created_at: now,
        updated_at: now,
        pull_request: None,
    }
}

pub(crate) fn pull_request(number: u64) -> Resource {
    Resource {
        kind: ResourceKind::PullRequest,
        title: "WIP: add settings page".to_string(),
        pull_request: Some(PullRequestDetails {
            draft: false,
            base_branch: "main".to_string(),
            head_branch: "feature/settings".to_string(),
            changed_files: vec!["src/settings.rs".to_string()],
            reviews: vec![],
            merged: false,
        }),
        ..issue(number)
    }
}
