//! Friend entity type.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a [`Friend`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FriendId(Uuid);

impl FriendId {
    pub fn generate() -> Self {
        FriendId(Uuid::new_v4())
    }
}

impl fmt::Display for FriendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FriendId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FriendId(Uuid::parse_str(s)?))
    }
}

/// A contact.
///
/// The `events` relationship is the inverse of `Event::attendees` and is not
/// stored here: the event side owns the edges, and the store/export layers
/// derive the friend-side view from them. Storing both directions would be a
/// consistency hazard during merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friend {
    pub id: FriendId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    /// Platform name -> username. Keys are unique, case kept as entered;
    /// the ordered map makes exports reproducible.
    pub social_handles: BTreeMap<String, String>,
    pub notes: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
