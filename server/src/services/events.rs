use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use super::event_query::EventListQuery;
use super::UserDirectory;
use crate::models::{
    CreateEventRequest, Event, EventResponse, ReplaceEventRequest, UpdateEventRequest, User,
};
use crate::policy::{self, Requester};
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::pagination::Page;
use crate::utils::payload::DeferredJson;

/// How an update payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// `PUT`: the fields required on create must be present; fields with a
    /// create-time default keep their stored value when absent.
    Replace,
    /// `PATCH`: absent fields are left alone.
    Partial,
}

#[derive(Clone)]
pub struct EventService {
    store: SharedStore,
}

impl EventService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Public events, plus the requester's own and invited events, newest first.
    ///
    /// The three sets are fetched independently and merged by id.
    pub async fn visible_events(&self, requester: Requester) -> AppResult<Vec<Event>> {
        let mut batches = vec![self.store.public_events().await?];
        if let Some(user_id) = requester.user_id() {
            batches.push(self.store.events_organized_by(user_id).await?);
            batches.push(self.store.events_inviting(user_id).await?);
        }

        let mut seen = HashSet::new();
        let mut events: Vec<Event> = batches
            .into_iter()
            .flatten()
            .filter(|event| seen.insert(event.id))
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    #[instrument(skip(self, query))]
    pub async fn list_visible_events(
        &self,
        requester: Requester,
        query: &EventListQuery,
    ) -> AppResult<Page<EventResponse>> {
        let events = self.visible_events(requester).await?;
        let mut responses: Vec<EventResponse> = self
            .to_responses(events)
            .await?
            .into_iter()
            .filter(|event| query.matches(event))
            .collect();
        query.sort(&mut responses);
        Page::paginate(responses, query.page_params())
    }

    #[instrument(skip(self))]
    pub async fn get_event(&self, requester: Requester, id: Uuid) -> AppResult<EventResponse> {
        let event = self
            .store
            .find_event(id)
            .await?
            .filter(|event| policy::can_view(requester, event))
            .ok_or_else(event_not_found)?;
        self.to_response(event).await
    }

    #[instrument(skip(self, organizer, payload), fields(organizer = %organizer.id))]
    pub async fn create_event(
        &self,
        organizer: &User,
        payload: &DeferredJson,
    ) -> AppResult<EventResponse> {
        let request: CreateEventRequest = payload.decode_validated()?;
        self.check_invitees(&request.invited_users).await?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            organizer_id: organizer.id,
            location: request.location,
            start_time: request.start_time,
            end_time: request.end_time,
            is_public: request.is_public,
            invited_users: crate::models::event::dedup_ids(request.invited_users),
            created_at: now,
            updated_at: now,
        };
        let event = self.store.insert_event(&event).await?;
        info!(event_id = %event.id, "Event created");
        self.to_response(event).await
    }

    /// Ownership is settled before the payload is even parsed.
    #[instrument(skip(self, payload))]
    pub async fn update_event(
        &self,
        requester: Requester,
        id: Uuid,
        payload: &DeferredJson,
        mode: UpdateMode,
    ) -> AppResult<EventResponse> {
        let mut event = self.find_existing(id).await?;
        policy::can_edit(requester, &event)?;

        let patch: UpdateEventRequest = match mode {
            UpdateMode::Replace => payload.decode_validated::<ReplaceEventRequest>()?.into(),
            UpdateMode::Partial => payload.decode_validated()?,
        };
        if let Some(invited) = &patch.invited_users {
            self.check_invitees(invited).await?;
        }
        patch.apply_to(&mut event)?;
        event.updated_at = Utc::now();

        let event = self.store.update_event(&event).await?;
        info!(event_id = %event.id, "Event updated");
        self.to_response(event).await
    }

    #[instrument(skip(self))]
    pub async fn delete_event(&self, requester: Requester, id: Uuid) -> AppResult<()> {
        let event = self.find_existing(id).await?;
        policy::can_delete(requester, &event)?;

        if !self.store.delete_event(id).await? {
            return Err(event_not_found());
        }
        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    async fn find_existing(&self, id: Uuid) -> AppResult<Event> {
        self.store.find_event(id).await?.ok_or_else(event_not_found)
    }

    async fn check_invitees(&self, invited: &[Uuid]) -> AppResult<()> {
        if invited.is_empty() {
            return Ok(());
        }
        let known: HashSet<Uuid> = self
            .store
            .find_users(invited)
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect();

        if let Some(unknown) = invited.iter().find(|id| !known.contains(id)) {
            let mut error = ValidationError::new("unknown_user");
            error.message = Some(format!("Invalid pk \"{unknown}\" - object does not exist.").into());
            let mut errors = ValidationErrors::new();
            errors.add("invited_users", error);
            return Err(errors.into());
        }
        Ok(())
    }

    async fn to_response(&self, event: Event) -> AppResult<EventResponse> {
        let mut responses = self.to_responses(vec![event]).await?;
        responses
            .pop()
            .ok_or_else(|| AppError::InternalServerError("event vanished".to_string()))
    }

    async fn to_responses(&self, events: Vec<Event>) -> AppResult<Vec<EventResponse>> {
        let directory =
            UserDirectory::load(&self.store, events.iter().map(|e| e.organizer_id)).await?;
        events
            .into_iter()
            .map(|event| {
                let organizer = directory.summary(event.organizer_id)?;
                Ok(EventResponse::new(event, organizer))
            })
            .collect()
    }
}

fn event_not_found() -> AppError {
    AppError::not_found("No Event matches the given query.")
}
