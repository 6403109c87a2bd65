//! Conversion of octocrab errors into [`GitHubError`].

use octoflow_domain::error::GitHubError;

/// Keep GitHub's status code and message when the API answered, otherwise
/// fall back to the transport error text.
pub(crate) fn from_octocrab(err: octocrab::Error) -> GitHubError {
    match &err {
        octocrab::Error::GitHub { source, .. } => {
            GitHubError::new(Some(source.status_code.as_u16()), source.message.clone())
        }
        _ => GitHubError::new(None, err.to_string()),
    }
}

/// GraphQL failures come back as `200 OK` with an `errors` array.
pub(crate) fn from_graphql_errors(response: &serde_json::Value) -> Option<GitHubError> {
    let errors = response.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let message = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(serde_json::Value::as_str))
        .collect::<Vec<_>>()
        .join("; ");
    let status = errors
        .iter()
        .any(|e| e.get("type").and_then(serde_json::Value::as_str) == Some("NOT_FOUND"))
        .then_some(404);
    Some(GitHubError::new(status, message))
}
