use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Identity mirrored from the authentication system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Public shape of a user when nested inside other resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub full_name: String,
    pub bio: String,
    pub location: String,
    pub profile_picture: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    #[validate(length(max = 255))]
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub location: String,
    #[validate(url)]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: UserSummary,
    pub full_name: String,
    pub bio: String,
    pub location: String,
    pub profile_picture: Option<String>,
}

impl ProfileResponse {
    pub fn new(user: &User, profile: &UserProfile) -> Self {
        Self {
            user: user.into(),
            full_name: profile.full_name.clone(),
            bio: profile.bio.clone(),
            location: profile.location.clone(),
            profile_picture: profile.profile_picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub profile: Option<ProfileResponse>,
}
