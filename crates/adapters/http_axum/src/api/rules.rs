//! JSON REST handlers for automation rules.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use octoflow_app::ports::{GitHubClient, RuleEventPublisher, RuleRepository};
use octoflow_domain::id::RuleId;
use octoflow_domain::rule::{AutomationRule, NewRule, RuleUpdate};

use crate::error::ApiError;
use crate::state::AppState;

/// Query string of the import endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub replace: bool,
}

/// Body returned by the import endpoint.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub replaced: bool,
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<AutomationRule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// The pretty-printed rule document, served as JSON.
pub struct ExportResponse(String);

impl IntoResponse for ExportResponse {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "application/json"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"automation-rules.json\"",
                ),
            ],
            self.0,
        )
            .into_response()
    }
}

fn parse_rule_id(id: &str) -> Result<RuleId, ApiError> {
    RuleId::parse(id).map_err(ApiError::from)
}

/// `GET /api/rules`: list all rules in stored order.
pub async fn list<R, P, G>(
    State(state): State<AppState<R, P, G>>,
) -> Result<Json<Vec<AutomationRule>>, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let rules = state.rule_service.get_rules().await?;
    Ok(Json(rules))
}

/// `GET /api/rules/:id`: get a rule by ID.
pub async fn get<R, P, G>(
    State(state): State<AppState<R, P, G>>,
    Path(id): Path<String>,
) -> Result<Json<AutomationRule>, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let rule = state.rule_service.get_rule(parse_rule_id(&id)?).await?;
    Ok(Json(rule))
}

/// `POST /api/rules`: create a new rule.
pub async fn create<R, P, G>(
    State(state): State<AppState<R, P, G>>,
    Json(req): Json<NewRule>,
) -> Result<CreateResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let created = state.rule_service.create_rule(req).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PATCH /api/rules/:id`: apply a partial update.
pub async fn update<R, P, G>(
    State(state): State<AppState<R, P, G>>,
    Path(id): Path<String>,
    Json(req): Json<RuleUpdate>,
) -> Result<Json<AutomationRule>, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let updated = state.rule_service.update_rule(rule_id, req).await?;
    Ok(Json(updated))
}

/// `DELETE /api/rules/:id`: delete a rule.
pub async fn delete<R, P, G>(
    State(state): State<AppState<R, P, G>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    state.rule_service.delete_rule(parse_rule_id(&id)?).await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/rules/export`: download every rule as one JSON document.
pub async fn export<R, P, G>(
    State(state): State<AppState<R, P, G>>,
) -> Result<ExportResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let document = state.rule_service.export_rules().await?;
    Ok(ExportResponse(document))
}

/// `POST /api/rules/import?replace=bool`: import a previously exported
/// document. The raw body is handed to the service so malformed documents
/// surface as validation errors.
pub async fn import<R, P, G>(
    State(state): State<AppState<R, P, G>>,
    Query(params): Query<ImportParams>,
    body: String,
) -> Result<Json<ImportSummary>, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let imported = state
        .rule_service
        .import_rules(&body, params.replace)
        .await?;
    Ok(Json(ImportSummary {
        imported,
        replaced: params.replace,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::router::build;
    use crate::testing::{body_json, bug_rule, empty_request, json_request, test_state};

    fn new_rule_body() -> serde_json::Value {
        json!({
            "name": "Label bugs",
            "conditions": {
                "operator": "AND",
                "conditions": [{"type": "has_label", "label": "bug"}]
            },
            "actions": [{"type": "add_label", "label": "triage"}]
        })
    }

    #[tokio::test]
    async fn should_list_stored_rules() {
        let (state, _) = test_state(vec![bug_rule("first"), bug_rule("second")]);

        let response = build(state)
            .oneshot(empty_request("GET", "/api/rules"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["name"], "first");
        assert_eq!(body[1]["name"], "second");
    }

    #[tokio::test]
    async fn should_create_rule_and_return_created() {
        let (state, probes) = test_state(vec![]);

        let response = build(state)
            .oneshot(json_request("POST", "/api/rules", &new_rule_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Label bugs");
        assert_eq!(body["enabled"], true);
        assert_eq!(probes.repo.rules.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_rule_without_actions() {
        let (state, probes) = test_state(vec![]);
        let mut body = new_rule_body();
        body["actions"] = json!([]);

        let response = build(state)
            .oneshot(json_request("POST", "/api/rules", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(probes.repo.rules.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_get_rule_by_id() {
        let rule = bug_rule("lookup");
        let id = rule.id;
        let (state, _) = test_state(vec![rule]);

        let response = build(state)
            .oneshot(empty_request("GET", &format!("/api/rules/{id}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "lookup");
    }

    #[tokio::test]
    async fn should_return_bad_request_when_id_is_not_a_uuid() {
        let (state, _) = test_state(vec![]);

        let response = build(state)
            .oneshot(empty_request("GET", "/api/rules/not-a-uuid"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_not_found_when_rule_missing() {
        let (state, _) = test_state(vec![]);
        let id = octoflow_domain::id::RuleId::new();

        let response = build(state)
            .oneshot(empty_request("DELETE", &format!("/api/rules/{id}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_patch_only_given_fields() {
        let rule = bug_rule("before");
        let id = rule.id;
        let (state, _) = test_state(vec![rule]);

        let response = build(state)
            .oneshot(json_request(
                "PATCH",
                &format!("/api/rules/{id}"),
                &json!({"enabled": false}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["enabled"], false);
        assert_eq!(body["name"], "before");
    }

    #[tokio::test]
    async fn should_delete_rule_and_return_no_content() {
        let rule = bug_rule("doomed");
        let id = rule.id;
        let (state, probes) = test_state(vec![rule]);

        let response = build(state)
            .oneshot(empty_request("DELETE", &format!("/api/rules/{id}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(probes.repo.rules.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_export_rules_as_json_attachment() {
        let (state, _) = test_state(vec![bug_rule("exported")]);

        let response = build(state)
            .oneshot(empty_request("GET", "/api/rules/export"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body[0]["name"], "exported");
    }

    #[tokio::test]
    async fn should_replace_rules_when_importing_with_replace() {
        let exported = serde_json::to_value([bug_rule("imported")]).unwrap();
        let (state, probes) = test_state(vec![bug_rule("old-1"), bug_rule("old-2")]);

        let response = build(state)
            .oneshot(json_request(
                "POST",
                "/api/rules/import?replace=true",
                &exported,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"imported": 1, "replaced": true})
        );
        let stored = probes.repo.rules.lock().unwrap().clone();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "imported");
    }

    #[tokio::test]
    async fn should_append_rules_when_importing_without_replace() {
        let exported = serde_json::to_value([bug_rule("imported")]).unwrap();
        let (state, probes) = test_state(vec![bug_rule("kept")]);

        let response = build(state)
            .oneshot(json_request("POST", "/api/rules/import", &exported))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(probes.repo.rules.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_reject_malformed_import_document() {
        let (state, probes) = test_state(vec![bug_rule("kept")]);

        let response = build(state)
            .oneshot(json_request(
                "POST",
                "/api/rules/import",
                &json!({"not": "an array"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(probes.repo.rules.lock().unwrap().len(), 1);
    }
}
