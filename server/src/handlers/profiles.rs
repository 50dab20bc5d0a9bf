use axum::extract::State;
use axum::response::Response;

use crate::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::payload::DeferredJson;
use crate::utils::response::success;

pub async fn me(State(state): State<AppState>, user: AuthenticatedUser) -> AppResult<Response> {
    let me = state.profiles.me(&user.0).await?;
    Ok(success(me, "Current user"))
}

pub async fn upsert_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: DeferredJson,
) -> AppResult<Response> {
    let profile = state.profiles.upsert_profile(&user.0, &payload).await?;
    Ok(success(profile, "Profile saved"))
}
