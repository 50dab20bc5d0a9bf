use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::rsvps::parent_event;
use super::UserDirectory;
use crate::models::{CreateReviewRequest, Review, ReviewResponse, UpdateReviewRequest, User};
use crate::policy::{self, Requester};
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::payload::DeferredJson;

#[derive(Clone)]
pub struct ReviewService {
    store: SharedStore,
}

impl ReviewService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self, user, payload), fields(user = %user.id))]
    pub async fn create_review(
        &self,
        user: &User,
        event_id: Uuid,
        payload: &DeferredJson,
    ) -> AppResult<ReviewResponse> {
        let event = parent_event(&self.store, event_id).await?;
        let request: CreateReviewRequest = payload.decode_validated()?;

        let review = Review {
            id: Uuid::new_v4(),
            event_id: event.id,
            user_id: user.id,
            rating: request.rating,
            comment: request.comment,
            created_at: Utc::now(),
        };
        let review = self.store.insert_review(&review).await?;
        info!(review_id = %review.id, event_id = %event.id, "Review created");
        Ok(ReviewResponse::new(review, user.into()))
    }

    #[instrument(skip(self))]
    pub async fn list_reviews(&self, event_id: Uuid) -> AppResult<Vec<ReviewResponse>> {
        let reviews = self.store.list_reviews(event_id).await?;
        let directory =
            UserDirectory::load(&self.store, reviews.iter().map(|r| r.user_id)).await?;
        reviews
            .into_iter()
            .map(|review| {
                let user = directory.summary(review.user_id)?;
                Ok(ReviewResponse::new(review, user))
            })
            .collect()
    }

    #[instrument(skip(self, payload))]
    pub async fn update_review(
        &self,
        requester: Requester,
        event_id: Uuid,
        review_id: Uuid,
        payload: &DeferredJson,
    ) -> AppResult<ReviewResponse> {
        let mut review = self.find_owned(requester, event_id, review_id).await?;

        let request: UpdateReviewRequest = payload.decode_validated()?;
        request.apply_to(&mut review);
        let review = self.store.update_review(&review).await?;
        info!(review_id = %review.id, "Review updated");

        let directory = UserDirectory::load(&self.store, [review.user_id]).await?;
        let user = directory.summary(review.user_id)?;
        Ok(ReviewResponse::new(review, user))
    }

    #[instrument(skip(self))]
    pub async fn delete_review(
        &self,
        requester: Requester,
        event_id: Uuid,
        review_id: Uuid,
    ) -> AppResult<()> {
        let review = self.find_owned(requester, event_id, review_id).await?;
        if !self.store.delete_review(review.id).await? {
            return Err(review_not_found());
        }
        info!(review_id = %review.id, "Review deleted");
        Ok(())
    }

    async fn find_owned(
        &self,
        requester: Requester,
        event_id: Uuid,
        review_id: Uuid,
    ) -> AppResult<Review> {
        let review = self
            .store
            .find_review(event_id, review_id)
            .await?
            .ok_or_else(review_not_found)?;
        policy::can_modify_review(requester, &review)?;
        Ok(review)
    }
}

fn review_not_found() -> AppError {
    AppError::not_found("No Review matches the given query.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Event;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use std::sync::Arc;

    async fn setup() -> (ReviewService, User, User, Uuid) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut users = Vec::new();
        for name in ["raghu", "guest"] {
            let user = User {
                id: Uuid::new_v4(),
                username: name.to_string(),
                email: format!("{name}@example.com"),
                created_at: Utc::now(),
            };
            users.push(store.upsert_user(&user).await.unwrap());
        }
        let guest = users.pop().unwrap();
        let author = users.pop().unwrap();

        let now = Utc::now();
        let event = store
            .insert_event(&Event {
                id: Uuid::new_v4(),
                title: "Test Event".to_string(),
                description: String::new(),
                organizer_id: guest.id,
                location: "Chennai".to_string(),
                start_time: now,
                end_time: now + Duration::hours(1),
                is_public: true,
                invited_users: Vec::new(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        (ReviewService::new(store), author, guest, event.id)
    }

    fn review_body(rating: i16, comment: &str) -> DeferredJson {
        DeferredJson::new(serde_json::json!({ "rating": rating, "comment": comment }).to_string())
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (service, author, guest, event_id) = setup().await;
        service.create_review(&author, event_id, &review_body(4, "first")).await.unwrap();
        service.create_review(&guest, event_id, &review_body(5, "second")).await.unwrap();

        let reviews = service.list_reviews(event_id).await.unwrap();
        let comments: Vec<_> = reviews.iter().map(|r| r.comment.as_str()).collect();
        assert_eq!(comments, ["second", "first"]);
    }

    #[tokio::test]
    async fn test_create_validates_rating() {
        let (service, author, _, event_id) = setup().await;
        let result = service.create_review(&author, event_id, &review_body(6, "too much")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_event_is_forbidden() {
        let (service, author, _, _) = setup().await;
        let result = service
            .create_review(&author, Uuid::new_v4(), &review_body(5, "Awesome event!"))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_only_author_changes_review() {
        let (service, author, guest, event_id) = setup().await;
        let review = service
            .create_review(&author, event_id, &review_body(3, "fine"))
            .await
            .unwrap();

        let result = service
            .update_review(guest.id.into(), event_id, review.id, &review_body(1, "bad"))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        let result = service.delete_review(guest.id.into(), event_id, review.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let updated = service
            .update_review(
                author.id.into(),
                event_id,
                review.id,
                &DeferredJson::new(r#"{"rating": 5}"#),
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, 5);
        assert_eq!(updated.comment, "fine");

        service.delete_review(author.id.into(), event_id, review.id).await.unwrap();
        assert!(service.list_reviews(event_id).await.unwrap().is_empty());
    }
}
