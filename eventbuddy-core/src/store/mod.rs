//! Entity storage collaborators.
//!
//! The engine treats storage as an external collaborator: each operation
//! reads a snapshot, stages its creates and updates, and issues exactly one
//! [`EntityStore::commit`]. Staging is in-memory and infallible; `commit` is
//! the single fallible write, and [`EntityStore::rollback`] discards staged
//! work after a failed commit.
//!
//! A store value has a single writer. The `&mut` receivers enforce that for
//! one process; callers must additionally not point two processes at the same
//! underlying store file.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::event::{Event, EventId};
use crate::friend::{Friend, FriendId};

/// Marker recording that the store was seeded from a feed once.
///
/// Owned and persisted by the store itself, never by an ambient settings key,
/// so seeding state travels with the data it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub feed_version: String,
    pub seeded_at: DateTime<Utc>,
}

/// Persistent collection of events and friends.
pub trait EntityStore {
    /// Snapshot of all events (committed state; staged writes are invisible).
    fn events(&self) -> Result<Vec<Event>, StoreError>;

    /// Snapshot of all friends.
    fn friends(&self) -> Result<Vec<Friend>, StoreError>;

    /// Snapshot of the events matching a predicate.
    fn events_matching(
        &self,
        predicate: &dyn Fn(&Event) -> bool,
    ) -> Result<Vec<Event>, StoreError> {
        Ok(self.events()?.into_iter().filter(|e| predicate(e)).collect())
    }

    /// Stage an insert-or-replace keyed by the event's id.
    fn upsert_event(&mut self, event: Event);

    /// Stage an insert-or-replace keyed by the friend's id.
    fn upsert_friend(&mut self, friend: Friend);

    fn seed_record(&self) -> Result<Option<SeedRecord>, StoreError>;

    /// Stage the seed marker; persisted by the next `commit`.
    fn set_seed_record(&mut self, record: SeedRecord);

    /// Promote staged writes to the committed state, persisting where the
    /// backend is durable.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Drop staged writes, restoring the last committed state.
    fn rollback(&mut self);
}

/// Full dataset of a store, shared by both backends and used verbatim as the
/// file backend's document format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoreState {
    pub events: BTreeMap<EventId, Event>,
    pub friends: BTreeMap<FriendId, Friend>,
    pub seed: Option<SeedRecord>,
}
