use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::UserDirectory;
use crate::models::{CreateRsvpRequest, Event, Rsvp, RsvpResponse, UpdateRsvpRequest, User};
use crate::policy::{self, Requester};
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::payload::DeferredJson;

#[derive(Clone)]
pub struct RsvpService {
    store: SharedStore,
}

impl RsvpService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self, user, payload), fields(user = %user.id))]
    pub async fn create_rsvp(
        &self,
        user: &User,
        event_id: Uuid,
        payload: &DeferredJson,
    ) -> AppResult<RsvpResponse> {
        let event = parent_event(&self.store, event_id).await?;
        let request: CreateRsvpRequest = payload.decode()?;

        let rsvp = Rsvp {
            id: Uuid::new_v4(),
            event_id: event.id,
            user_id: user.id,
            status: request.status,
            created_at: Utc::now(),
        };
        let rsvp = self.store.insert_rsvp(&rsvp).await?;
        info!(rsvp_id = %rsvp.id, event_id = %event.id, "RSVP created");
        Ok(RsvpResponse::new(rsvp, user.into()))
    }

    /// Every RSVP of the event, whatever the event's visibility.
    #[instrument(skip(self))]
    pub async fn list_rsvps(&self, event_id: Uuid) -> AppResult<Vec<RsvpResponse>> {
        let rsvps = self.store.list_rsvps(event_id).await?;
        let directory = UserDirectory::load(&self.store, rsvps.iter().map(|r| r.user_id)).await?;
        rsvps
            .into_iter()
            .map(|rsvp| {
                let user = directory.summary(rsvp.user_id)?;
                Ok(RsvpResponse::new(rsvp, user))
            })
            .collect()
    }

    #[instrument(skip(self, payload))]
    pub async fn update_rsvp_status(
        &self,
        requester: Requester,
        event_id: Uuid,
        rsvp_id: Uuid,
        payload: &DeferredJson,
    ) -> AppResult<RsvpResponse> {
        let mut rsvp = self
            .store
            .find_rsvp(event_id, rsvp_id)
            .await?
            .ok_or_else(|| AppError::not_found("No RSVP matches the given query."))?;
        policy::can_update_rsvp(requester, &rsvp)?;

        let request: UpdateRsvpRequest = payload.decode()?;
        if let Some(status) = request.status {
            rsvp.status = status;
        }
        let rsvp = self.store.update_rsvp(&rsvp).await?;
        info!(rsvp_id = %rsvp.id, status = ?rsvp.status, "RSVP updated");

        let directory = UserDirectory::load(&self.store, [rsvp.user_id]).await?;
        let user = directory.summary(rsvp.user_id)?;
        Ok(RsvpResponse::new(rsvp, user))
    }
}

/// Looks up the event a nested resource is being created under.
///
/// A missing event is reported as Forbidden, not NotFound.
pub(crate) async fn parent_event(store: &SharedStore, event_id: Uuid) -> AppResult<Event> {
    store
        .find_event(event_id)
        .await?
        .ok_or_else(|| AppError::forbidden("Event not found."))
}
