use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::path::PathIds;
use crate::utils::payload::DeferredJson;
use crate::utils::response::{created, no_content, success};

pub async fn list_reviews(
    State(state): State<AppState>,
    PathIds(event_id): PathIds<Uuid>,
) -> AppResult<Response> {
    let reviews = state.reviews.list_reviews(event_id).await?;
    Ok(success(reviews, "Reviews retrieved"))
}

pub async fn create_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathIds(event_id): PathIds<Uuid>,
    payload: DeferredJson,
) -> AppResult<Response> {
    let review = state.reviews.create_review(&user.0, event_id, &payload).await?;
    Ok(created(review, "Review added"))
}

pub async fn update_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathIds((event_id, review_id)): PathIds<(Uuid, Uuid)>,
    payload: DeferredJson,
) -> AppResult<Response> {
    let review = state
        .reviews
        .update_review(user.requester(), event_id, review_id, &payload)
        .await?;
    Ok(success(review, "Review updated"))
}

pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathIds((event_id, review_id)): PathIds<(Uuid, Uuid)>,
) -> AppResult<Response> {
    state
        .reviews
        .delete_review(user.requester(), event_id, review_id)
        .await?;
    Ok(no_content())
}
