//! Event entity type.
//!
//! Events come from two places: the remote feed (via `feed::sync`) and
//! backups (via `backup::import`). Interactive creation happens in the UI
//! layer and reaches the engine only through the store.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::friend::FriendId;

/// Unique identifier for an [`Event`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn generate() -> Self {
        EventId(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EventId(Uuid::parse_str(s)?))
    }
}

/// A calendar event with its relationship sets.
///
/// The event side owns both relationship sets; the friend-side view is
/// derived from these (see `Friend`). Ordered sets keep exports reproducible
/// regardless of insertion order.
///
/// `end_date >= start_date` is expected but not enforced here; the merge
/// operations take both dates from the same source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub address: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Open tag ("conference", "meetup", ...); unknown feed values pass through.
    pub event_type: String,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub requires_ticket: bool,
    pub requires_registration: bool,
    /// Local-only: whether the user plans to attend. Never touched by merges.
    pub is_attending: bool,
    /// Local-only: true for events the user created rather than feed events.
    pub is_custom_event: bool,
    /// Timezone identifier the event was published in, e.g. `Europe/Berlin`
    /// or a derived `UTC+02:00` for feed records that only carry an offset.
    pub original_timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Friends attending this event (cascade: removing the event drops the
    /// linkage, never the friends).
    pub attendees: BTreeSet<FriendId>,
    /// Friends who want to meet at this event (nullify-style linkage).
    pub wishes: BTreeSet<FriendId>,
}
