use axum::routing::{get, patch, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{events, health_check, profiles, reviews, rsvps};
use crate::state::AppState;

/// API routes without the HTTP middleware stack.
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:event_id",
            get(events::get_event)
                .put(events::replace_event)
                .patch(events::patch_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/:event_id/rsvp",
            get(rsvps::list_rsvps).post(rsvps::create_rsvp),
        )
        .route("/events/:event_id/rsvp/:rsvp_id", patch(rsvps::update_rsvp))
        .route(
            "/events/:event_id/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/events/:event_id/reviews/:review_id",
            patch(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/me", get(profiles::me))
        .route("/me/profile", put(profiles::upsert_profile))
        .with_state(state)
}

pub fn create_app(state: AppState, config: &Config) -> Router {
    create_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
}
