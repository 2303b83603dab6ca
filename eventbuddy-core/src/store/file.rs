//! JSON-file-backed store.
//!
//! The whole dataset lives in one JSON document. `commit` rewrites it
//! atomically (write to a temp file, then rename), so a crash mid-commit
//! leaves the previous document intact.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;
use crate::event::Event;
use crate::friend::Friend;
use crate::store::{EntityStore, SeedRecord, StoreState};

pub struct FileStore {
    path: PathBuf,
    committed: StoreState,
    staged: StoreState,
}

impl FileStore {
    /// Open the store document, or start empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let committed = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(StoreError::Corrupt)?
        } else {
            debug!(path = %path.display(), "store file missing, starting empty");
            StoreState::default()
        };

        Ok(FileStore {
            path,
            staged: committed.clone(),
            committed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            serde_json::to_string_pretty(&self.staged).map_err(StoreError::Serialize)?;

        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl EntityStore for FileStore {
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
        self.persist()?;
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
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.events().unwrap().is_empty());
        assert!(store.friends().unwrap().is_empty());
        assert!(store.seed_record().unwrap().is_none());
    }

    #[test]
    fn commit_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store.upsert_friend(friend("Ada"));
        store.commit().unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.friends().unwrap().len(), 1);
        assert_eq!(reopened.friends().unwrap()[0].name, "Ada");
    }

    #[test]
    fn uncommitted_writes_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store.upsert_friend(friend("Ada"));
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.friends().unwrap().is_empty());
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
    }
}
