//! Server-Sent Events (SSE) stream of rule-list changes.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use octoflow_app::ports::{GitHubClient, RuleChange, RuleEventPublisher, RuleRepository};

use crate::state::AppState;

fn to_sse_event(change: &RuleChange) -> Option<Event> {
    match serde_json::to_string(change) {
        Ok(json) => Some(Event::default().event(change.name()).data(json)),
        Err(err) => {
            tracing::warn!(%err, "failed to serialize rule change for SSE stream");
            None
        }
    }
}

/// `GET /api/rules/stream`: SSE stream of committed rule changes.
///
/// Each change is sent with its kind as the SSE `event:` field and the JSON
/// encoded [`RuleChange`] as `data:`. Clients reload the rule list on any
/// event. The stream continues until the client disconnects or the bus is
/// closed.
pub async fn stream<R, P, G>(
    State(state): State<AppState<R, P, G>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    R: RuleRepository + Send + Sync + 'static,
    P: RuleEventPublisher + Send + Sync + 'static,
    G: GitHubClient + Send + Sync + 'static,
{
    let rx = state.rule_bus.subscribe();
    let events = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(change) => to_sse_event(&change).map(Ok),
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some rule changes were dropped");
            None
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
