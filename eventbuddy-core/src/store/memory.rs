//! In-memory store, used by tests and as the reference for commit semantics.

use crate::error::StoreError;
use crate::event::Event;
use crate::friend::Friend;
use crate::store::{EntityStore, SeedRecord, StoreState};

#[derive(Debug, Default)]
pub struct MemoryStore {
    committed: StoreState,
    staged: StoreState,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Build a store that already contains the given entities, committed.
    pub fn with_data(
        events: impl IntoIterator<Item = Event>,
        friends: impl IntoIterator<Item = Friend>,
    ) -> Self {
        let mut store = MemoryStore::new();
        for event in events {
            store.committed.events.insert(event.id, event);
        }
        for friend in friends {
            store.committed.friends.insert(friend.id, friend);
        }
        store.staged = store.committed.clone();
        store
    }
}

impl EntityStore for MemoryStore {
    fn events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.committed.events.values().cloned().collect())
    }

    fn friends(&self) -> Result<Vec<Friend>, StoreError> {
        Ok(self.committed.friends.values().cloned().collect())
    }

    fn upsert_event(&mut self, event: Event) {
        self.staged.events.insert(event.id, event);
    }

    fn upsert_friend(&mut self, friend: Friend) {
        self.staged.friends.insert(friend.id, friend);
    }

    fn seed_record(&self) -> Result<Option<SeedRecord>, StoreError> {
        Ok(self.committed.seed.clone())
    }

    fn set_seed_record(&mut self, record: SeedRecord) {
        self.staged.seed = Some(record);
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.committed = self.staged.clone();
        Ok(())
    }

    fn rollback(&mut self) {
        self.staged = self.committed.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    use crate::friend::FriendId;

    fn friend(name: &str) -> Friend {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Friend {
            id: FriendId::generate(),
            name: name.to_string(),
            email: None,
            phone: None,
            job_title: None,
            company: None,
            social_handles: BTreeMap::new(),
            notes: None,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn staged_writes_invisible_until_commit() {
        let mut store = MemoryStore::new();
        store.upsert_friend(friend("Ada"));

        assert!(store.friends().unwrap().is_empty());
        store.commit().unwrap();
        assert_eq!(store.friends().unwrap().len(), 1);
    }

    #[test]
    fn rollback_discards_staged_writes() {
        let mut store = MemoryStore::new();
        store.upsert_friend(friend("Ada"));
        store.commit().unwrap();

        store.upsert_friend(friend("Grace"));
        store.rollback();
        store.commit().unwrap();

        assert_eq!(store.friends().unwrap().len(), 1);
    }
}
