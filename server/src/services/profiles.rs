use chrono::Utc;
use tracing::instrument;

use crate::models::{MeResponse, ProfileResponse, UpsertProfileRequest, User, UserProfile};
use crate::store::SharedStore;
use crate::utils::error::AppResult;
use crate::utils::payload::DeferredJson;

#[derive(Clone)]
pub struct ProfileService {
    store: SharedStore,
}

impl ProfileService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self, user), fields(user = %user.id))]
    pub async fn me(&self, user: &User) -> AppResult<MeResponse> {
        let profile = self.store.find_profile(user.id).await?;
        Ok(MeResponse {
            user: user.into(),
            profile: profile.map(|profile| ProfileResponse::new(user, &profile)),
        })
    }

    #[instrument(skip(self, user, payload), fields(user = %user.id))]
    pub async fn upsert_profile(
        &self,
        user: &User,
        payload: &DeferredJson,
    ) -> AppResult<ProfileResponse> {
        let request: UpsertProfileRequest = payload.decode_validated()?;
        let profile = self
            .store
            .save_profile(&UserProfile {
                user_id: user.id,
                full_name: request.full_name,
                bio: request.bio,
                location: request.location,
                profile_picture: request.profile_picture,
                updated_at: Utc::now(),
            })
            .await?;
        Ok(ProfileResponse::new(user, &profile))
    }
}
