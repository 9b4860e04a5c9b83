//! Proxy route.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::Result;
use crate::state::AppState;

/// Handle `ANY <prefix>/{*path}`.
///
/// The handler only forwards GET; everything else is answered here with
/// `405 Method Not Allowed`.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Result<Response> {
    match state.proxy.handle(request).await? {
        Some(response) => Ok(response),
        None => Ok((StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET")]).into_response()),
    }
}
