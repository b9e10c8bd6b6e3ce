//! Bearer token gate for agent routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// Reject the request unless its `Authorization` header carries the live token.
///
/// A header that is missing or not valid UTF-8 is treated as empty, so the
/// authority decides whether that reads as "not initialized", "expired" or
/// "invalid".
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    state.authority().verify_header(header_value)?;
    Ok(next.run(request).await)
}
