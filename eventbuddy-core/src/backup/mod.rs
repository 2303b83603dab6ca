//! Portable backup envelope.
//!
//! The backup is the authoritative interchange format: one versioned JSON
//! document carrying every event and friend plus the relationship edges
//! between them. Records use the entity's own id verbatim; there is no
//! re-keying at export time.

pub mod export;
pub mod import;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{Event, EventId};
use crate::friend::{Friend, FriendId};

/// The one backup format version this build reads and writes.
pub const BACKUP_VERSION: &str = "1.0";

/// Canonical name of the JSON document inside an export package.
pub const BACKUP_FILENAME: &str = "eventbuddy_backup.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub events: Vec<EventExportRecord>,
    pub friends: Vec<FriendExportRecord>,
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationships {
    pub event_attendees: Vec<RelationshipEdge>,
    pub event_wishes: Vec<RelationshipEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdge {
    pub event_id: EventId,
    pub friend_id: FriendId,
}

/// An event flattened for the backup: same fields, no relationship sets
/// (those live in [`Relationships`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventExportRecord {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub address: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub event_type: String,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub requires_ticket: bool,
    pub requires_registration: bool,
    pub is_attending: bool,
    pub is_custom_event: bool,
    pub original_timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventExportRecord {
    pub fn from_event(event: &Event) -> Self {
        EventExportRecord {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            address: event.address.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            event_type: event.event_type.clone(),
            notes: event.notes.clone(),
            url: event.url.clone(),
            requires_ticket: event.requires_ticket,
            requires_registration: event.requires_registration,
            is_attending: event.is_attending,
            is_custom_event: event.is_custom_event,
            original_timezone: event.original_timezone.clone(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }

    /// Rebuild a live event. Relationship sets start empty; the importer
    /// fills them from the envelope's edge lists.
    pub fn into_event(self) -> Event {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            location: self.location,
            address: self.address,
            start_date: self.start_date,
            end_date: self.end_date,
            event_type: self.event_type,
            notes: self.notes,
            url: self.url,
            requires_ticket: self.requires_ticket,
            requires_registration: self.requires_registration,
            is_attending: self.is_attending,
            is_custom_event: self.is_custom_event,
            original_timezone: self.original_timezone,
            created_at: self.created_at,
            updated_at: self.updated_at,
            attendees: Default::default(),
            wishes: Default::default(),
        }
    }

    /// Overwrite an existing event's fields, keeping its relationship sets.
    pub fn apply_to(self, event: &mut Event) {
        let keep_attendees = std::mem::take(&mut event.attendees);
        let keep_wishes = std::mem::take(&mut event.wishes);
        *event = self.into_event();
        event.attendees = keep_attendees;
        event.wishes = keep_wishes;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendExportRecord {
    pub id: FriendId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub social_handles: BTreeMap<String, String>,
    pub notes: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FriendExportRecord {
    pub fn from_friend(friend: &Friend) -> Self {
        FriendExportRecord {
            id: friend.id,
            name: friend.name.clone(),
            email: friend.email.clone(),
            phone: friend.phone.clone(),
            job_title: friend.job_title.clone(),
            company: friend.company.clone(),
            social_handles: friend.social_handles.clone(),
            notes: friend.notes.clone(),
            is_favorite: friend.is_favorite,
            created_at: friend.created_at,
            updated_at: friend.updated_at,
        }
    }

    pub fn into_friend(self) -> Friend {
        Friend {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            job_title: self.job_title,
            company: self.company,
            social_handles: self.social_handles,
            notes: self.notes,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
