use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Event, Review, Rsvp, User, UserProfile};
use crate::utils::error::{AppError, AppResult};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn Store>;

pub(crate) fn username_taken(username: &str) -> AppError {
    AppError::Conflict(format!("A user with username '{username}' already exists."))
}

/// Persistence for users, events and their sub-resources.
///
/// Deleting an event removes its invitations, RSVPs and reviews.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts the user or refreshes username and email of an existing id.
    ///
    /// Usernames are unique; claiming one held by another id is a conflict.
    async fn upsert_user(&self, user: &User) -> AppResult<User>;
    async fn find_users(&self, ids: &[Uuid]) -> AppResult<Vec<User>>;

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;
    async fn save_profile(&self, profile: &UserProfile) -> AppResult<UserProfile>;

    async fn public_events(&self) -> AppResult<Vec<Event>>;
    async fn events_organized_by(&self, user_id: Uuid) -> AppResult<Vec<Event>>;
    async fn events_inviting(&self, user_id: Uuid) -> AppResult<Vec<Event>>;
    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>>;
    async fn insert_event(&self, event: &Event) -> AppResult<Event>;
    async fn update_event(&self, event: &Event) -> AppResult<Event>;
    /// Returns false when no event had that id.
    async fn delete_event(&self, id: Uuid) -> AppResult<bool>;

    async fn insert_rsvp(&self, rsvp: &Rsvp) -> AppResult<Rsvp>;
    async fn list_rsvps(&self, event_id: Uuid) -> AppResult<Vec<Rsvp>>;
    async fn find_rsvp(&self, event_id: Uuid, rsvp_id: Uuid) -> AppResult<Option<Rsvp>>;
    async fn update_rsvp(&self, rsvp: &Rsvp) -> AppResult<Rsvp>;

    async fn insert_review(&self, review: &Review) -> AppResult<Review>;
    /// Newest first.
    async fn list_reviews(&self, event_id: Uuid) -> AppResult<Vec<Review>>;
    async fn find_review(&self, event_id: Uuid, review_id: Uuid) -> AppResult<Option<Review>>;
    async fn update_review(&self, review: &Review) -> AppResult<Review>;
    async fn delete_review(&self, review_id: Uuid) -> AppResult<bool>;
}
