pub mod event;
pub mod review;
pub mod rsvp;
pub mod user;

pub use event::{
    CreateEventRequest, Event, EventResponse, ReplaceEventRequest, UpdateEventRequest,
};
pub use review::{CreateReviewRequest, Review, ReviewResponse, UpdateReviewRequest};
pub use rsvp::{CreateRsvpRequest, Rsvp, RsvpResponse, RsvpStatus, UpdateRsvpRequest};
pub use user::{MeResponse, ProfileResponse, UpsertProfileRequest, User, UserProfile, UserSummary};
