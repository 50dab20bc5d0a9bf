use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::user::UserSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(min = 1))]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i16>,
    #[validate(length(min = 1))]
    pub comment: Option<String>,
}

impl UpdateReviewRequest {
    pub fn apply_to(self, review: &mut Review) {
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if let Some(comment) = self.comment {
            review.comment = comment;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub event: Uuid,
    pub user: UserSummary,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewResponse {
    pub fn new(review: Review, user: UserSummary) -> Self {
        Self {
            id: review.id,
            event: review.event_id,
            user,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}
