use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::path::PathIds;
use crate::utils::payload::DeferredJson;
use crate::utils::response::{created, success};

pub async fn list_rsvps(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    PathIds(event_id): PathIds<Uuid>,
) -> AppResult<Response> {
    let rsvps = state.rsvps.list_rsvps(event_id).await?;
    Ok(success(rsvps, "RSVPs retrieved"))
}

pub async fn create_rsvp(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathIds(event_id): PathIds<Uuid>,
    payload: DeferredJson,
) -> AppResult<Response> {
    let rsvp = state.rsvps.create_rsvp(&user.0, event_id, &payload).await?;
    Ok(created(rsvp, "RSVP recorded"))
}

pub async fn update_rsvp(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathIds((event_id, rsvp_id)): PathIds<(Uuid, Uuid)>,
    payload: DeferredJson,
) -> AppResult<Response> {
    let rsvp = state
        .rsvps
        .update_rsvp_status(user.requester(), event_id, rsvp_id, &payload)
        .await?;
    Ok(success(rsvp, "RSVP updated"))
}
