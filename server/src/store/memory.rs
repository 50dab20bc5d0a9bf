use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{username_taken, Store};
use crate::models::{Event, Review, Rsvp, User, UserProfile};
use crate::utils::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, UserProfile>,
    events: HashMap<Uuid, Event>,
    // Insertion order stands in for the created_at/primary key order of a table.
    rsvps: Vec<Rsvp>,
    reviews: Vec<Review>,
}

/// Process-local store, used when no `DATABASE_URL` is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(what: &str, id: Uuid) -> AppError {
    AppError::not_found(format!("{what} '{id}' does not exist"))
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_user(&self, user: &User) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|existing| existing.id != user.id && existing.username == user.username)
        {
            return Err(username_taken(&user.username));
        }
        let stored = tables
            .users
            .entry(user.id)
            .and_modify(|existing| {
                existing.username = user.username.clone();
                existing.email = user.email.clone();
            })
            .or_insert_with(|| user.clone());
        Ok(stored.clone())
    }

    async fn find_users(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn save_profile(&self, profile: &UserProfile) -> AppResult<UserProfile> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&profile.user_id) {
            return Err(missing("user", profile.user_id));
        }
        tables.profiles.insert(profile.user_id, profile.clone());
        Ok(profile.clone())
    }

    async fn public_events(&self) -> AppResult<Vec<Event>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .values()
            .filter(|event| event.is_public)
            .cloned()
            .collect())
    }

    async fn events_organized_by(&self, user_id: Uuid) -> AppResult<Vec<Event>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .values()
            .filter(|event| event.is_organizer(user_id))
            .cloned()
            .collect())
    }

    async fn events_inviting(&self, user_id: Uuid) -> AppResult<Vec<Event>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .values()
            .filter(|event| event.is_invited(user_id))
            .cloned()
            .collect())
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn insert_event(&self, event: &Event) -> AppResult<Event> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&event.organizer_id) {
            return Err(missing("user", event.organizer_id));
        }
        tables.events.insert(event.id, event.clone());
        Ok(event.clone())
    }

    async fn update_event(&self, event: &Event) -> AppResult<Event> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .events
            .get_mut(&event.id)
            .ok_or_else(|| missing("event", event.id))?;
        *stored = event.clone();
        Ok(event.clone())
    }

    async fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.events.remove(&id).is_none() {
            return Ok(false);
        }
        tables.rsvps.retain(|rsvp| rsvp.event_id != id);
        tables.reviews.retain(|review| review.event_id != id);
        Ok(true)
    }

    async fn insert_rsvp(&self, rsvp: &Rsvp) -> AppResult<Rsvp> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&rsvp.event_id) {
            return Err(missing("event", rsvp.event_id));
        }
        tables.rsvps.push(rsvp.clone());
        Ok(rsvp.clone())
    }

    async fn list_rsvps(&self, event_id: Uuid) -> AppResult<Vec<Rsvp>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rsvps
            .iter()
            .filter(|rsvp| rsvp.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn find_rsvp(&self, event_id: Uuid, rsvp_id: Uuid) -> AppResult<Option<Rsvp>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rsvps
            .iter()
            .find(|rsvp| rsvp.id == rsvp_id && rsvp.event_id == event_id)
            .cloned())
    }

    async fn update_rsvp(&self, rsvp: &Rsvp) -> AppResult<Rsvp> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .rsvps
            .iter_mut()
            .find(|stored| stored.id == rsvp.id)
            .ok_or_else(|| missing("rsvp", rsvp.id))?;
        stored.status = rsvp.status;
        Ok(stored.clone())
    }

    async fn insert_review(&self, review: &Review) -> AppResult<Review> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&review.event_id) {
            return Err(missing("event", review.event_id));
        }
        tables.reviews.push(review.clone());
        Ok(review.clone())
    }

    async fn list_reviews(&self, event_id: Uuid) -> AppResult<Vec<Review>> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|review| review.event_id == event_id)
            .cloned()
            .collect();
        // Stable sort; reversing first keeps equal timestamps newest first.
        reviews.reverse();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn find_review(&self, event_id: Uuid, review_id: Uuid) -> AppResult<Option<Review>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .iter()
            .find(|review| review.id == review_id && review.event_id == event_id)
            .cloned())
    }

    async fn update_review(&self, review: &Review) -> AppResult<Review> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .reviews
            .iter_mut()
            .find(|stored| stored.id == review.id)
            .ok_or_else(|| missing("review", review.id))?;
        stored.rating = review.rating;
        stored.comment = review.comment.clone();
        Ok(stored.clone())
    }

    async fn delete_review(&self, review_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.reviews.len();
        tables.reviews.retain(|review| review.id != review_id);
        Ok(tables.reviews.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RsvpStatus;
    use chrono::{Duration, Utc};

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{name}@example.com"),
            created_at: Utc::now(),
        }
    }

    fn event(organizer: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "Test Event".to_string(),
            description: String::new(),
            organizer_id: organizer,
            location: "Chennai".to_string(),
            start_time: now,
            end_time: now + Duration::hours(1),
            is_public: true,
            invited_users: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_upsert_user_refreshes_identity() {
        let store = MemoryStore::new();
        let mut raghu = user("raghu");
        store.upsert_user(&raghu).await.unwrap();

        raghu.email = "new@example.com".to_string();
        store.upsert_user(&raghu).await.unwrap();

        let found = store.find_users(&[raghu.id]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "new@example.com");
    }

    #[tokio::test]
    async fn test_username_held_by_another_id_conflicts() {
        let store = MemoryStore::new();
        let raghu = user("raghu");
        store.upsert_user(&raghu).await.unwrap();

        let result = store.upsert_user(&user("raghu")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let mut renamed = user("guest");
        store.upsert_user(&renamed).await.unwrap();
        renamed.username = "raghu".to_string();
        let result = store.upsert_user(&renamed).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        assert!(store.upsert_user(&raghu).await.is_ok());
    }

    #[tokio::test]
    async fn test_event_requires_known_organizer() {
        let store = MemoryStore::new();
        let result = store.insert_event(&event(Uuid::new_v4())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_event_cascades() {
        let store = MemoryStore::new();
        let organizer = user("raghu");
        store.upsert_user(&organizer).await.unwrap();
        let event = store.insert_event(&event(organizer.id)).await.unwrap();

        store
            .insert_rsvp(&Rsvp {
                id: Uuid::new_v4(),
                event_id: event.id,
                user_id: organizer.id,
                status: RsvpStatus::Going,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        store
            .insert_review(&Review {
                id: Uuid::new_v4(),
                event_id: event.id,
                user_id: organizer.id,
                rating: 5,
                comment: "Awesome event!".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(store.delete_event(event.id).await.unwrap());
        assert!(store.list_rsvps(event.id).await.unwrap().is_empty());
        assert!(store.list_reviews(event.id).await.unwrap().is_empty());
        assert!(!store.delete_event(event.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_rsvp_is_scoped_to_event() {
        let store = MemoryStore::new();
        let organizer = user("raghu");
        store.upsert_user(&organizer).await.unwrap();
        let first = store.insert_event(&event(organizer.id)).await.unwrap();
        let second = store.insert_event(&event(organizer.id)).await.unwrap();

        let rsvp = store
            .insert_rsvp(&Rsvp {
                id: Uuid::new_v4(),
                event_id: first.id,
                user_id: organizer.id,
                status: RsvpStatus::Maybe,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(store.find_rsvp(first.id, rsvp.id).await.unwrap().is_some());
        assert!(store.find_rsvp(second.id, rsvp.id).await.unwrap().is_none());
    }
}
