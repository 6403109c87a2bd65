//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use octoflow_app::ports::{GitHubClient, RuleEventPublisher, RuleRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api`. Includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level using the `tracing`
/// ecosystem.
pub fn build<R, P, G>(state: AppState<R, P, G>) -> Router
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
