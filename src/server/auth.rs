//! Shared-secret bearer authentication.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::{error::ApiError, AppState};

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Runs before routing. `OPTIONS` is answered with an empty 200 without
/// checking credentials; everything else must carry the shared secret.
pub async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let matches = bearer_token(request.headers()).map(|token| token == state.api_key());
    match matches {
        Some(true) => next.run(request).await,
        Some(false) => {
            tracing::debug!(path = %request.uri().path(), "rejected request with wrong token");
            ApiError::Unauthorized.into_response()
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "rejected request without token");
            ApiError::Unauthorized.into_response()
        }
    }
}
