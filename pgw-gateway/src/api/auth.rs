//! Authentication middleware
//!
//! Applied to the asset routes only; `/health` stays public.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::services::auth_gate::AuthRejection;
use crate::AppState;

/// Resolve the bearer token and attach the caller to the request
///
/// Handlers behind this layer extract `Extension<AuthenticatedCaller>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Non-visible-ASCII header values cannot carry a bearer token
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthRejection::BadFormat)?),
        None => None,
    };

    let caller = state.auth.authenticate(header).await?;
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}
