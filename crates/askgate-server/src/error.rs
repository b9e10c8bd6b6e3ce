//! Error types for the HTTP surface.

use askgate_agents::AgentError;
use askgate_auth::AuthError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors returned by handlers and the bearer middleware.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credential or token rejection.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Malformed request body.
    #[error("{0}")]
    BadRequest(String),

    /// Agent failure, passed through without retry.
    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Agent(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Agent(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
            ApiError::Agent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Auth(e) => {
                let body = Json(json!({ "detail": e.to_string(), "code": e.code() }));
                let mut response = (status, body).into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(askgate_auth::BEARER_SCHEME),
                );
                response
            }
            other => {
                if status.is_server_error() {
                    tracing::error!(error = %other, "Request failed");
                }
                (status, Json(json!({ "detail": other.to_string() }))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askgate_agents::AgentKind;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(AuthError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(AgentError::InvalidSource("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AgentError::Upstream("x".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(AgentError::SourceNotLoaded(AgentKind::Tabular)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_rejection_carries_challenge() {
        let response = ApiError::from(AuthError::NotInitialized).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
