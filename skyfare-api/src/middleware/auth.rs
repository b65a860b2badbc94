use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{error::AppError, state::AppState};

// ============================================================================
// Session Gate
// ============================================================================

/// Resolves the bearer token into a [`skyfare_core::Session`] and stores it
/// in the request extensions. Anything short of a valid token ends the
/// request with 401 before the handler runs.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

    let session = state.auth.authenticate(bearer.token())?;
    tracing::debug!("Authenticated user {}", session.user_id);

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
