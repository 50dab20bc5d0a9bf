use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rsvp_status")]
pub enum RsvpStatus {
    #[serde(rename = "Going")]
    #[sqlx(rename = "Going")]
    Going,
    #[serde(rename = "Not Going")]
    #[sqlx(rename = "Not Going")]
    NotGoing,
    #[serde(rename = "Maybe")]
    #[sqlx(rename = "Maybe")]
    Maybe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Rsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: RsvpStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRsvpRequest {
    pub status: RsvpStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRsvpRequest {
    pub status: Option<RsvpStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RsvpResponse {
    pub id: Uuid,
    pub event: Uuid,
    pub user: UserSummary,
    pub status: RsvpStatus,
    pub created_at: DateTime<Utc>,
}

impl RsvpResponse {
    pub fn new(rsvp: Rsvp, user: UserSummary) -> Self {
        Self {
            id: rsvp.id,
            event: rsvp.event_id,
            user,
            status: rsvp.status,
            created_at: rsvp.created_at,
        }
    }
}
