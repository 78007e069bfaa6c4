//! Bearer-token middleware for protected routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::bearer_token;
use crate::api::AppState;
use crate::error::ApiError;

/// Reject the request unless it carries a valid `Authorization: Bearer`
/// token. On success the verified [`Claims`](super::Claims) are attached
/// to the request extensions for the duration of this request; no session
/// state outlives it.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = bearer_token(header)?;
    let claims = state.auth.verify_token(token)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
