//! Built-in rule templates.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use octoflow_app::ports::{GitHubClient, RuleEventPublisher, RuleRepository};
use octoflow_domain::template::{Template, templates};

use crate::api::rules::CreateResponse;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct InstantiateParams {
    /// Login recorded as the rule's author.
    #[serde(default)]
    pub created_by: Option<String>,
}

/// `GET /api/templates`: list the built-in templates.
pub async fn list() -> Json<&'static [Template]> {
    Json(templates())
}

/// `POST /api/templates/:key`: create a rule from a template.
pub async fn create<R, P, G>(
    State(state): State<AppState<R, P, G>>,
    Path(key): Path<String>,
    Query(params): Query<InstantiateParams>,
) -> Result<CreateResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let created_by = params.created_by.unwrap_or_default();
    let created = state
        .rule_service
        .create_from_template(&key, &created_by)
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}
