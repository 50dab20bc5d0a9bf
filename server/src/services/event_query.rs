use std::cmp::Ordering;

use serde::Deserialize;

use crate::models::EventResponse;
use crate::utils::pagination::PageParams;

/// Query string accepted by `GET /events`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListQuery {
    pub location: Option<String>,
    #[serde(rename = "organizer__username", alias = "organizer")]
    pub organizer_username: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortField {
    CreatedAt,
    StartTime,
    EndTime,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(SortField::CreatedAt),
            "start_time" => Some(SortField::StartTime),
            "end_time" => Some(SortField::EndTime),
            _ => None,
        }
    }

    fn compare(self, a: &EventResponse, b: &EventResponse) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::StartTime => a.start_time.cmp(&b.start_time),
            SortField::EndTime => a.end_time.cmp(&b.end_time),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SortKey {
    field: SortField,
    descending: bool,
}

const DEFAULT_ORDERING: [SortKey; 1] = [SortKey {
    field: SortField::CreatedAt,
    descending: true,
}];

impl EventListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.page_size)
    }

    /// Exact-match filters plus the search terms.
    pub fn matches(&self, event: &EventResponse) -> bool {
        if let Some(location) = non_empty(&self.location) {
            if event.location != location {
                return false;
            }
        }
        if let Some(username) = non_empty(&self.organizer_username) {
            if event.organizer.username != username {
                return false;
            }
        }
        match non_empty(&self.search) {
            Some(search) => search_terms_match(search, event),
            None => true,
        }
    }

    /// Stable sort by the requested keys; unknown fields are skipped.
    pub fn sort(&self, events: &mut [EventResponse]) {
        let keys = self.sort_keys();
        events.sort_by(|a, b| {
            keys.iter()
                .map(|key| {
                    let ordering = key.field.compare(a, b);
                    if key.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }

    fn sort_keys(&self) -> Vec<SortKey> {
        let keys: Vec<SortKey> = non_empty(&self.ordering)
            .map(|ordering| {
                ordering
                    .split(',')
                    .filter_map(|raw| {
                        let raw = raw.trim();
                        let (descending, name) = match raw.strip_prefix('-') {
                            Some(name) => (true, name),
                            None => (false, raw),
                        };
                        SortField::parse(name).map(|field| SortKey { field, descending })
                    })
                    .collect()
            })
            .unwrap_or_default();

        if keys.is_empty() {
            DEFAULT_ORDERING.to_vec()
        } else {
            keys
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Every whitespace-separated term must occur, case-insensitively, in the
/// title, the location or the organizer's username.
fn search_terms_match(search: &str, event: &EventResponse) -> bool {
    let haystacks = [
        event.title.to_lowercase(),
        event.location.to_lowercase(),
        event.organizer.username.to_lowercase(),
    ];
    search.split_whitespace().all(|term| {
        let term = term.to_lowercase();
        haystacks.iter().any(|haystack| haystack.contains(&term))
    })
}
