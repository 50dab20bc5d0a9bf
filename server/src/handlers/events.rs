use axum::extract::{Query, State};
use axum::response::Response;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::policy::Requester;
use crate::services::events::UpdateMode;
use crate::services::EventListQuery;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::path::PathIds;
use crate::utils::payload::DeferredJson;
use crate::utils::response::{created, no_content, success};

pub async fn list_events(
    State(state): State<AppState>,
    requester: Requester,
    query: Result<Query<EventListQuery>, axum::extract::rejection::QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = state.events.list_visible_events(requester, &query).await?;
    Ok(success(page, "Events retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: DeferredJson,
) -> AppResult<Response> {
    let event = state.events.create_event(&user.0, &payload).await?;
    Ok(created(event, "Event created"))
}

pub async fn get_event(
    State(state): State<AppState>,
    requester: Requester,
    PathIds(event_id): PathIds<Uuid>,
) -> AppResult<Response> {
    let event = state.events.get_event(requester, event_id).await?;
    Ok(success(event, "Event retrieved"))
}

pub async fn replace_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathIds(event_id): PathIds<Uuid>,
    payload: DeferredJson,
) -> AppResult<Response> {
    let event = state
        .events
        .update_event(user.requester(), event_id, &payload, UpdateMode::Replace)
        .await?;
    Ok(success(event, "Event updated"))
}

pub async fn patch_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathIds(event_id): PathIds<Uuid>,
    payload: DeferredJson,
) -> AppResult<Response> {
    let event = state
        .events
        .update_event(user.requester(), event_id, &payload, UpdateMode::Partial)
        .await?;
    Ok(success(event, "Event updated"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathIds(event_id): PathIds<Uuid>,
) -> AppResult<Response> {
    state.events.delete_event(user.requester(), event_id).await?;
    Ok(no_content())
}
