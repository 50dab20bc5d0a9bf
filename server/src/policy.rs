//! Who may see and change events and their RSVPs and reviews.
//!
//! Every function here is a pure predicate over an explicit [`Requester`];
//! nothing reads the current request or touches the store.

use uuid::Uuid;

use crate::models::{Event, Review, Rsvp};
use crate::utils::error::{AppError, AppResult};

/// The identity behind one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    Anonymous,
    User(Uuid),
}

impl Requester {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Requester::Anonymous => None,
            Requester::User(id) => Some(*id),
        }
    }

    fn is(&self, user_id: Uuid) -> bool {
        self.user_id() == Some(user_id)
    }
}

impl From<Uuid> for Requester {
    fn from(id: Uuid) -> Self {
        Requester::User(id)
    }
}

pub fn can_view(requester: Requester, event: &Event) -> bool {
    if event.is_public {
        return true;
    }
    match requester {
        Requester::Anonymous => false,
        Requester::User(id) => event.is_organizer(id) || event.is_invited(id),
    }
}

pub fn can_edit(requester: Requester, event: &Event) -> AppResult<()> {
    if requester.is(event.organizer_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("You can only edit your own events."))
    }
}

pub fn can_delete(requester: Requester, event: &Event) -> AppResult<()> {
    if requester.is(event.organizer_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("You can only delete your own events."))
    }
}

pub fn can_update_rsvp(requester: Requester, rsvp: &Rsvp) -> AppResult<()> {
    if requester.is(rsvp.user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("You can only update your own RSVP."))
    }
}

pub fn can_modify_review(requester: Requester, review: &Review) -> AppResult<()> {
    if requester.is(review.user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("You can only change your own reviews."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RsvpStatus;
    use chrono::{Duration, Utc};

    fn event(organizer: Uuid, is_public: bool, invited: Vec<Uuid>) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "Private Event".to_string(),
            description: "Invite-only event.".to_string(),
            organizer_id: organizer,
            location: "Mumbai".to_string(),
            start_time: now,
            end_time: now + Duration::hours(2),
            is_public,
            invited_users: invited,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_public_event_visible_to_everyone() {
        let organizer = Uuid::new_v4();
        let public = event(organizer, true, Vec::new());

        assert!(can_view(Requester::Anonymous, &public));
        assert!(can_view(Requester::User(Uuid::new_v4()), &public));
        assert!(can_view(Requester::User(organizer), &public));
    }

    #[test]
    fn test_private_event_visibility() {
        let organizer = Uuid::new_v4();
        let invited = Uuid::new_v4();
        let private = event(organizer, false, vec![invited]);

        assert!(can_view(Requester::User(organizer), &private));
        assert!(can_view(Requester::User(invited), &private));
        assert!(!can_view(Requester::User(Uuid::new_v4()), &private));
        assert!(!can_view(Requester::Anonymous, &private));
    }

    #[test]
    fn test_only_organizer_can_edit_or_delete() {
        let organizer = Uuid::new_v4();
        let invited = Uuid::new_v4();
        let private = event(organizer, false, vec![invited]);

        assert!(can_edit(Requester::User(organizer), &private).is_ok());
        assert!(can_delete(Requester::User(organizer), &private).is_ok());

        for requester in [Requester::User(invited), Requester::Anonymous] {
            assert!(matches!(
                can_edit(requester, &private),
                Err(AppError::Forbidden(_))
            ));
            assert!(matches!(
                can_delete(requester, &private),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_rsvp_owner_only() {
        let owner = Uuid::new_v4();
        let rsvp = Rsvp {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            user_id: owner,
            status: RsvpStatus::Maybe,
            created_at: Utc::now(),
        };

        assert!(can_update_rsvp(Requester::User(owner), &rsvp).is_ok());
        assert!(can_update_rsvp(Requester::User(Uuid::new_v4()), &rsvp).is_err());
        assert!(can_update_rsvp(Requester::Anonymous, &rsvp).is_err());
    }

    #[test]
    fn test_review_author_only() {
        let author = Uuid::new_v4();
        let review = Review {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            user_id: author,
            rating: 4,
            comment: "Nice".to_string(),
            created_at: Utc::now(),
        };

        assert!(can_modify_review(Requester::User(author), &review).is_ok());
        assert!(can_modify_review(Requester::User(Uuid::new_v4()), &review).is_err());
    }
}
