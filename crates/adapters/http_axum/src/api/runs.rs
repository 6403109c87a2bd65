//! Run the automation rules against one issue or pull request.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Deserialize;

use octoflow_app::ports::{GitHubClient, RuleEventPublisher, RuleRepository};
use octoflow_domain::error::ValidationError;
use octoflow_domain::execution::RuleExecutionResult;
use octoflow_domain::rule::AutomationRule;

use crate::error::ApiError;
use crate::state::AppState;

/// Optional request body. Without `rules` the stored rules are used.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub rules: Option<Vec<AutomationRule>>,
}

fn explicit_rules(body: &Bytes) -> Result<Option<Vec<AutomationRule>>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let request: RunRequest = serde_json::from_slice(body)
        .map_err(|err| ValidationError::InvalidDocument(err.to_string()))?;
    Ok(request.rules)
}

/// `POST /api/repos/:owner/:repo/issues/:number/run`
pub async fn run_issue<R, P, G>(
    State(state): State<AppState<R, P, G>>,
    Path((owner, repo, number)): Path<(String, String, u64)>,
    body: Bytes,
) -> Result<Json<Vec<RuleExecutionResult>>, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let rules = explicit_rules(&body)?;
    let results = state
        .automation_service
        .execute_rules_for_issue(&owner, &repo, number, rules)
        .await?;
    Ok(Json(results))
}

/// `POST /api/repos/:owner/:repo/pulls/:number/run`
pub async fn run_pull_request<R, P, G>(
    State(state): State<AppState<R, P, G>>,
    Path((owner, repo, number)): Path<(String, String, u64)>,
    body: Bytes,
) -> Result<Json<Vec<RuleExecutionResult>>, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let rules = explicit_rules(&body)?;
    let results = state
        .automation_service
        .execute_rules_for_pull_request(&owner, &repo, number, rules)
        .await?;
    Ok(Json(results))
}
