//! Backup restore with validation and last-write-wins merging.
//!
//! The pipeline is all-or-nothing: everything fallible (source resolution,
//! decoding, version and referential-integrity validation) runs before any
//! store mutation; the merge itself happens on maps local to the call; store
//! writes are staged and committed once, with a rollback if the commit fails.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backup::{BackupEnvelope, BACKUP_FILENAME, BACKUP_VERSION};
use crate::error::ImportError;
use crate::event::{Event, EventId};
use crate::friend::{Friend, FriendId};
use crate::store::EntityStore;

/// Created/updated/skipped tallies for one entity kind. A skip is a record
/// whose local copy was at least as new; it is never an error.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeCounts {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub events: MergeCounts,
    pub friends: MergeCounts,
    pub relationships_created: usize,
}

/// Restore a backup into the store.
///
/// `source` may be the backup JSON file itself or an export package
/// directory, which is probed for the canonical filename.
///
/// Existing entities are updated only when the backup record is strictly
/// newer (`updated_at` alone; ties lose). This is deliberately stricter than
/// the feed syncer's "newer or field-diff" rule: the backup came from our own
/// exporter, whose timestamps are trustworthy.
///
/// The caller must not start another sync/export/import against the same
/// store until this call returns.
pub fn import_from<S: EntityStore>(
    source: &Path,
    store: &mut S,
) -> Result<ImportReport, ImportError> {
    let path = resolve_source(source)?;
    let bytes = fs::read(&path).map_err(|e| ImportError::Read {
        path: path.clone(),
        source: e,
    })?;
    let envelope: BackupEnvelope =
        serde_json::from_slice(&bytes).map_err(ImportError::Decode)?;
    validate(&envelope)?;
    merge(envelope, store)
}

fn resolve_source(source: &Path) -> Result<PathBuf, ImportError> {
    if source.is_file() {
        return Ok(source.to_path_buf());
    }
    if source.is_dir() {
        let candidate = source.join(BACKUP_FILENAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(ImportError::SourceNotFound(source.to_path_buf()))
}

/// Reject unsupported versions and edges that point outside the envelope's
/// own entity lists. This checks the backup's internal consistency only; the
/// live store plays no part.
fn validate(envelope: &BackupEnvelope) -> Result<(), ImportError> {
    if envelope.version != BACKUP_VERSION {
        return Err(ImportError::IncompatibleVersion {
            found: envelope.version.clone(),
            expected: BACKUP_VERSION,
        });
    }

    let event_ids: HashSet<EventId> = envelope.events.iter().map(|e| e.id).collect();
    let friend_ids: HashSet<FriendId> = envelope.friends.iter().map(|f| f.id).collect();

    let edges = envelope
        .relationships
        .event_attendees
        .iter()
        .chain(&envelope.relationships.event_wishes);
    for edge in edges {
        if !event_ids.contains(&edge.event_id) {
            return Err(ImportError::ReferentialIntegrity {
                kind: "event",
                id: edge.event_id.to_string(),
            });
        }
        if !friend_ids.contains(&edge.friend_id) {
            return Err(ImportError::ReferentialIntegrity {
                kind: "friend",
                id: edge.friend_id.to_string(),
            });
        }
    }
    Ok(())
}

fn merge<S: EntityStore>(
    envelope: BackupEnvelope,
    store: &mut S,
) -> Result<ImportReport, ImportError> {
    let BackupEnvelope {
        events: event_records,
        friends: friend_records,
        relationships,
        ..
    } = envelope;

    let mut report = ImportReport::default();

    // Working maps are the identity index (backup id -> live entity), scoped
    // to this call and dropped after commit. Backup ids become live ids
    // verbatim on create, so both id spaces coincide after the merge.
    //
    // Friends merge before events, which may reference them once the edges
    // rebuild below.
    let mut friends: HashMap<FriendId, Friend> =
        store.friends()?.into_iter().map(|f| (f.id, f)).collect();
    for record in friend_records {
        match friends.entry(record.id) {
            Entry::Vacant(slot) => {
                report.friends.created += 1;
                slot.insert(record.into_friend());
            }
            Entry::Occupied(mut slot) => {
                if record.updated_at > slot.get().updated_at {
                    report.friends.updated += 1;
                    *slot.get_mut() = record.into_friend();
                } else {
                    report.friends.skipped += 1;
                }
            }
        }
    }

    let mut events: HashMap<EventId, Event> =
        store.events()?.into_iter().map(|e| (e.id, e)).collect();
    for record in event_records {
        match events.entry(record.id) {
            Entry::Vacant(slot) => {
                report.events.created += 1;
                slot.insert(record.into_event());
            }
            Entry::Occupied(mut slot) => {
                if record.updated_at > slot.get().updated_at {
                    report.events.updated += 1;
                    record.apply_to(slot.get_mut());
                } else {
                    report.events.skipped += 1;
                }
            }
        }
    }

    // Relationship union on the event side. Skipped entities still take part:
    // an edge can be new even when both endpoints were. Edges are additions
    // to sets, not field edits, so they do not bump updated_at; doing so
    // would break idempotent re-import and the export/import round trip.
    for edge in &relationships.event_attendees {
        match (events.get_mut(&edge.event_id), friends.contains_key(&edge.friend_id)) {
            (Some(event), true) => {
                if event.attendees.insert(edge.friend_id) {
                    report.relationships_created += 1;
                }
            }
            _ => debug!(
                event = %edge.event_id,
                friend = %edge.friend_id,
                "dropping attendance edge with unresolved endpoint"
            ),
        }
    }
    for edge in &relationships.event_wishes {
        match (events.get_mut(&edge.event_id), friends.contains_key(&edge.friend_id)) {
            (Some(event), true) => {
                if event.wishes.insert(edge.friend_id) {
                    report.relationships_created += 1;
                }
            }
            _ => debug!(
                event = %edge.event_id,
                friend = %edge.friend_id,
                "dropping wish edge with unresolved endpoint"
            ),
        }
    }

    // The working maps are the post-import state; write them back and commit
    // once.
    for friend in friends.into_values() {
        store.upsert_friend(friend);
    }
    for event in events.into_values() {
        store.upsert_event(event);
    }
    if let Err(err) = store.commit() {
        store.rollback();
        return Err(err.into());
    }

    Ok(report)
}
