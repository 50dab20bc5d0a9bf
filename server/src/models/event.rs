use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use super::user::UserSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub organizer_id: Uuid,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_public: bool,
    pub invited_users: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_organizer(&self, user_id: Uuid) -> bool {
        self.organizer_id == user_id
    }

    pub fn is_invited(&self, user_id: Uuid) -> bool {
        self.invited_users.contains(&user_id)
    }
}

/// Body of `POST /events`.
///
/// Has no organizer field. An `organizer` key in the body is dropped by
/// serde and the organizer is always the requester.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_event_schedule"))]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
    #[serde(default)]
    pub invited_users: Vec<Uuid>,
}

fn default_is_public() -> bool {
    true
}

fn validate_event_schedule(request: &CreateEventRequest) -> Result<(), ValidationError> {
    check_schedule(request.start_time, request.end_time)
}

/// Body of `PUT /events/{id}`.
///
/// The required fields of a create must be sent again. Fields that have a
/// default on create keep their stored value when absent, so a replace never
/// flips visibility or drops invitees unless asked to.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplaceEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_public: Option<bool>,
    pub invited_users: Option<Vec<Uuid>>,
}

/// Body of `PATCH /events/{id}`; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_public: Option<bool>,
    pub invited_users: Option<Vec<Uuid>>,
}

impl From<ReplaceEventRequest> for UpdateEventRequest {
    fn from(request: ReplaceEventRequest) -> Self {
        Self {
            title: Some(request.title),
            description: request.description,
            location: Some(request.location),
            start_time: Some(request.start_time),
            end_time: Some(request.end_time),
            is_public: request.is_public,
            invited_users: request.invited_users,
        }
    }
}

impl UpdateEventRequest {
    /// Applies the patch to `event` and re-checks the schedule of the result.
    pub fn apply_to(self, event: &mut Event) -> Result<(), ValidationErrors> {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            event.end_time = end_time;
        }
        if let Some(is_public) = self.is_public {
            event.is_public = is_public;
        }
        if let Some(invited_users) = self.invited_users {
            event.invited_users = dedup_ids(invited_users);
        }

        check_schedule(event.start_time, event.end_time).map_err(|error| {
            let mut errors = ValidationErrors::new();
            errors.add("end_time", error);
            errors
        })
    }
}

pub fn check_schedule(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ValidationError> {
    if start > end {
        let mut error = ValidationError::new("end_before_start");
        error.message = Some("end_time must not be earlier than start_time".into());
        return Err(error);
    }
    Ok(())
}

pub(crate) fn dedup_ids(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}

#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub organizer: UserSummary,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_public: bool,
    pub invited_users: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl EventResponse {
    pub fn new(event: Event, organizer: UserSummary) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            organizer,
            location: event.location,
            start_time: event.start_time,
            end_time: event.end_time,
            is_public: event.is_public,
            invited_users: event.invited_users,
            created_at: event.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_event() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "Launch".to_string(),
            description: String::new(),
            organizer_id: Uuid::new_v4(),
            location: "Chennai".to_string(),
            start_time: now,
            end_time: now + Duration::hours(2),
            is_public: true,
            invited_users: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_request_rejects_inverted_schedule() {
        let now = Utc::now();
        let request = CreateEventRequest {
            title: "Launch".to_string(),
            description: String::new(),
            location: "Chennai".to_string(),
            start_time: now,
            end_time: now - Duration::minutes(1),
            is_public: true,
            invited_users: Vec::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_ignores_organizer_key() {
        let body = serde_json::json!({
            "title": "Launch",
            "location": "Chennai",
            "start_time": "2025-10-30T10:00:00Z",
            "end_time": "2025-10-30T12:00:00Z",
            "organizer": Uuid::new_v4(),
        });
        let request: CreateEventRequest = serde_json::from_value(body).unwrap();
        assert!(request.is_public);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_patch_keeps_untouched_fields() {
        let mut event = sample_event();
        let original = event.clone();
        let patch = UpdateEventRequest {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut event).unwrap();
        assert_eq!(event.title, "Renamed");
        assert_eq!(event.location, original.location);
        assert_eq!(event.organizer_id, original.organizer_id);
    }

    #[test]
    fn test_patch_rechecks_schedule_against_existing_start() {
        let mut event = sample_event();
        let patch = UpdateEventRequest {
            end_time: Some(event.start_time - Duration::hours(1)),
            ..Default::default()
        };
        let errors = patch.apply_to(&mut event).unwrap_err();
        assert!(errors.field_errors().contains_key("end_time"));
    }

    #[test]
    fn test_replace_without_visibility_keeps_stored_access() {
        let mut event = sample_event();
        let guest = Uuid::new_v4();
        event.is_public = false;
        event.invited_users = vec![guest];

        let body = serde_json::json!({
            "title": "Launch v2",
            "location": "Mumbai",
            "start_time": "2025-10-30T10:00:00Z",
            "end_time": "2025-10-30T12:00:00Z",
        });
        let request: ReplaceEventRequest = serde_json::from_value(body).unwrap();
        UpdateEventRequest::from(request).apply_to(&mut event).unwrap();

        assert_eq!(event.title, "Launch v2");
        assert!(!event.is_public);
        assert_eq!(event.invited_users, vec![guest]);
    }

    #[test]
    fn test_replace_requires_create_fields() {
        let body = serde_json::json!({ "title": "Only title", "is_public": true });
        assert!(serde_json::from_value::<ReplaceEventRequest>(body).is_err());
    }

    #[test]
    fn test_patch_dedups_invited_users() {
        let mut event = sample_event();
        let guest = Uuid::new_v4();
        let patch = UpdateEventRequest {
            invited_users: Some(vec![guest, guest]),
            ..Default::default()
        };
        patch.apply_to(&mut event).unwrap();
        assert_eq!(event.invited_users, vec![guest]);
    }
}
