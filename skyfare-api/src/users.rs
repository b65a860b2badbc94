use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use skyfare_core::{ProfilePatch, PublicProfile, Session};

use crate::{error::AppError, state::AppState};

/// Every route here sits behind the session gate.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_profile).put(update_profile))
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<PublicProfile>, AppError> {
    Ok(Json(state.auth.get_profile(session.user_id).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    WithRejection(Json(patch), _): WithRejection<Json<ProfilePatch>, AppError>,
) -> Result<Json<PublicProfile>, AppError> {
    Ok(Json(state.auth.update_profile(session.user_id, patch).await?))
}
