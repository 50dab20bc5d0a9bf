use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::services::{EventService, ProfileService, ReviewService, RsvpService};
use crate::store::SharedStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub keys: Arc<JwtKeys>,
    pub events: EventService,
    pub rsvps: RsvpService,
    pub reviews: ReviewService,
    pub profiles: ProfileService,
}

impl AppState {
    pub fn new(store: SharedStore, jwt_secret: &str) -> Self {
        Self {
            keys: Arc::new(JwtKeys::from_secret(jwt_secret.as_bytes())),
            events: EventService::new(store.clone()),
            rsvps: RsvpService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            profiles: ProfileService::new(store.clone()),
            store,
        }
    }
}
