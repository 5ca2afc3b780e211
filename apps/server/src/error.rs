use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;
use vista::features::maps::MapServiceError;

/// A [`MapServiceError`] on its way out as an HTTP response.
#[derive(Debug)]
pub(crate) struct ApiError(pub(crate) MapServiceError);

impl From<MapServiceError> for ApiError {
    fn from(err: MapServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub(crate) const fn status(&self) -> StatusCode {
        match self.0 {
            MapServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            MapServiceError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            MapServiceError::DirectoryUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            MapServiceError::UnsupportedFormat { .. } => StatusCode::NOT_IMPLEMENTED,
            MapServiceError::InvalidName { .. } => StatusCode::BAD_REQUEST,
            MapServiceError::MalformedDocument { .. } | MapServiceError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!(error = %self.0, status = status.as_u16(), "Request failed");
            status.canonical_reason().unwrap_or("Internal Server Error").to_owned()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
