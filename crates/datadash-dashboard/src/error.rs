//! Error types for the dashboard crate.

use crate::templates::{empty_state, layout};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use datadash_core::StoreError;
use thiserror::Error;

/// Errors that can occur in the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Failed to start the server.
    #[error("failed to start dashboard: {0}")]
    StartupFailed(String),

    /// No such table or row.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The query pipeline or its store failed.
    #[error(transparent)]
    Query(#[from] datadash_core::Error),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        use datadash_core::Error;
        match self {
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DashboardError::Query(Error::InvalidField { .. }) => StatusCode::BAD_REQUEST,
            DashboardError::Query(Error::Store(StoreError::Conflict(_))) => StatusCode::CONFLICT,
            DashboardError::Query(Error::Store(StoreError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "dashboard request failed");
        }

        let title = status.canonical_reason().unwrap_or("Error");
        let page = layout(
            title,
            &empty_state("exclamation-triangle", title, &self.to_string(), None),
        );
        (status, Html(page)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            DashboardError::NotFound("users".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DashboardError::Query(datadash_core::Error::invalid_field("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DashboardError::Query(StoreError::Conflict("dup".into()).into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DashboardError::Query(StoreError::Poisoned("lock".into()).into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_renders_page() {
        let response = DashboardError::NotFound("no table 'x'".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
