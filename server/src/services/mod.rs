use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{User, UserSummary};
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};

pub mod event_query;
pub mod events;
pub mod profiles;
pub mod reviews;
pub mod rsvps;

pub use event_query::EventListQuery;
pub use events::EventService;
pub use profiles::ProfileService;
pub use reviews::ReviewService;
pub use rsvps::RsvpService;

/// Users referenced by a batch of resources, keyed by id.
pub(crate) struct UserDirectory(HashMap<Uuid, User>);

impl UserDirectory {
    pub(crate) async fn load(
        store: &SharedStore,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> AppResult<Self> {
        let mut ids: Vec<Uuid> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        let users = store.find_users(&ids).await?;
        Ok(Self(users.into_iter().map(|user| (user.id, user)).collect()))
    }

    pub(crate) fn summary(&self, id: Uuid) -> AppResult<UserSummary> {
        self.0
            .get(&id)
            .map(UserSummary::from)
            .ok_or_else(|| AppError::InternalServerError(format!("user '{id}' is missing")))
    }
}
