//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use octoflow_domain::error::{OctoflowError, ValidationError, display_chain};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`OctoflowError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(OctoflowError);

impl From<OctoflowError> for ApiError {
    fn from(err: OctoflowError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(OctoflowError::Validation(err))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            OctoflowError::Validation(_) => StatusCode::BAD_REQUEST,
            OctoflowError::NotFound(_) => StatusCode::NOT_FOUND,
            // the issue or pull request itself does not exist
            OctoflowError::GitHub(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            OctoflowError::GitHub(_) | OctoflowError::DuplicateSaga(_) => StatusCode::BAD_GATEWAY,
            OctoflowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            OctoflowError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                "internal server error".to_string()
            }
            other => display_chain(other),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
