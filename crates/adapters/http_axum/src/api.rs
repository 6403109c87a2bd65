//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod rules;
#[allow(clippy::missing_errors_doc)]
pub mod runs;
pub mod sse;
#[allow(clippy::missing_errors_doc)]
pub mod templates;

use axum::Router;
use axum::routing::{get, post};

use octoflow_app::ports::{GitHubClient, RuleEventPublisher, RuleRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, P, G>() -> Router<AppState<R, P, G>>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    Router::new()
        // Rules
        .route(
            "/rules",
            get(rules::list::<R, P, G>).post(rules::create::<R, P, G>),
        )
        .route("/rules/export", get(rules::export::<R, P, G>))
        .route("/rules/import", post(rules::import::<R, P, G>))
        .route("/rules/stream", get(sse::stream::<R, P, G>))
        .route(
            "/rules/{id}",
            get(rules::get::<R, P, G>)
                .patch(rules::update::<R, P, G>)
                .delete(rules::delete::<R, P, G>),
        )
        // Templates
        .route("/templates", get(templates::list))
        .route("/templates/{key}", post(templates::create::<R, P, G>))
        // Runs
        .route(
            "/repos/{owner}/{repo}/issues/{number}/run",
            post(runs::run_issue::<R, P, G>),
        )
        .route(
            "/repos/{owner}/{repo}/pulls/{number}/run",
            post(runs::run_pull_request::<R, P, G>),
        )
}
