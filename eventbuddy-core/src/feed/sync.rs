//! Reconciliation of a remote feed against the local store.
//!
//! The merge is additive/union, keyed by event id: feed records create or
//! update events and never delete them, and local-only state (attendance,
//! custom flag, relationship sets) survives updates untouched. Re-running
//! with an unchanged feed is a no-op.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::codec::dates::{derive_timezone, parse_feed_datetime};
use crate::error::SyncError;
use crate::event::{Event, EventId};
use crate::feed::{FeedEnvelope, FeedEventRecord};
use crate::store::{EntityStore, SeedRecord};

/// Counts from one sync pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    /// Records dropped for an unparseable id or date. Never fatal.
    pub skipped: usize,
}

/// A feed record with its id and dates parsed.
struct ParsedRecord<'a> {
    record: &'a FeedEventRecord,
    id: EventId,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    timezone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> ParsedRecord<'a> {
    fn parse(record: &'a FeedEventRecord) -> Option<Self> {
        let id = record.id.parse().ok()?;
        let start = parse_feed_datetime(&record.start_date)?;
        let end = parse_feed_datetime(&record.end_date)?;
        let created = parse_feed_datetime(&record.created_at)?;
        let updated = parse_feed_datetime(&record.updated_at)?;

        Some(ParsedRecord {
            record,
            id,
            timezone: derive_timezone(&start),
            start_date: start.with_timezone(&Utc),
            end_date: end.with_timezone(&Utc),
            created_at: created.with_timezone(&Utc),
            updated_at: updated.with_timezone(&Utc),
        })
    }

    /// True if any feed-owned field differs from the local copy.
    fn differs_from(&self, local: &Event) -> bool {
        let r = self.record;
        local.title != r.title
            || local.description != r.description
            || local.location != r.location
            || local.address != r.address
            || local.event_type != r.event_type
            || local.notes != r.notes
            || local.requires_ticket != r.requires_ticket
            || local.requires_registration != r.requires_registration
            || local.url != r.url
            || local.start_date != self.start_date
            || local.end_date != self.end_date
            || local.original_timezone != self.timezone
    }

    /// Overwrite the feed-owned fields of an existing event, keeping its
    /// identity, local-only flags, and relationship sets.
    fn apply_to(&self, event: &mut Event) {
        let r = self.record;
        event.title = r.title.clone();
        event.description = r.description.clone();
        event.location = r.location.clone();
        event.address = r.address.clone();
        event.event_type = r.event_type.clone();
        event.notes = r.notes.clone();
        event.requires_ticket = r.requires_ticket;
        event.requires_registration = r.requires_registration;
        event.url = r.url.clone();
        event.start_date = self.start_date;
        event.end_date = self.end_date;
        event.original_timezone = self.timezone.clone();
        event.updated_at = self.updated_at;
    }

    fn into_event(self) -> Event {
        let r = self.record;
        Event {
            id: self.id,
            title: r.title.clone(),
            description: r.description.clone(),
            location: r.location.clone(),
            address: r.address.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            event_type: r.event_type.clone(),
            notes: r.notes.clone(),
            url: r.url.clone(),
            requires_ticket: r.requires_ticket,
            requires_registration: r.requires_registration,
            is_attending: false,
            is_custom_event: false,
            original_timezone: self.timezone,
            created_at: self.created_at,
            updated_at: self.updated_at,
            attendees: Default::default(),
            wishes: Default::default(),
        }
    }
}

/// Merge a decoded feed into the store: one snapshot read, one commit.
///
/// An existing event is updated when the feed record is newer **or** any
/// feed-owned field differs. Feeds are not trusted to bump `updatedAt` on
/// every edit, so the field comparison backs up the timestamp check; backup
/// import (`backup::import`) deliberately trusts the timestamp alone.
///
/// The caller must not start another sync/export/import against the same
/// store until this call returns.
pub fn sync<S: EntityStore>(feed: &FeedEnvelope, store: &mut S) -> Result<SyncReport, SyncError> {
    let local: HashMap<EventId, Event> =
        store.events()?.into_iter().map(|e| (e.id, e)).collect();

    let mut report = SyncReport::default();
    let mut creates: Vec<Event> = Vec::new();
    let mut updates: Vec<Event> = Vec::new();

    for record in &feed.events {
        let Some(parsed) = ParsedRecord::parse(record) else {
            warn!(id = %record.id, title = %record.title, "skipping malformed feed record");
            report.skipped += 1;
            continue;
        };

        match local.get(&parsed.id) {
            None => creates.push(parsed.into_event()),
            Some(existing) => {
                if parsed.updated_at > existing.updated_at || parsed.differs_from(existing) {
                    let mut event = existing.clone();
                    parsed.apply_to(&mut event);
                    updates.push(event);
                }
            }
        }
    }

    report.created = creates.len();
    report.updated = updates.len();

    for event in creates {
        store.upsert_event(event);
    }
    for event in updates {
        store.upsert_event(event);
    }

    if let Err(err) = store.commit() {
        store.rollback();
        return Err(err.into());
    }

    Ok(report)
}

/// Run the first-ever sync and record the seed marker, or do nothing if the
/// store has been seeded before. The marker commits together with the merged
/// events, so a failed seed leaves no trace.
pub fn seed_if_needed<S: EntityStore>(
    feed: &FeedEnvelope,
    store: &mut S,
) -> Result<Option<SyncReport>, SyncError> {
    if store.seed_record()?.is_some() {
        return Ok(None);
    }

    store.set_seed_record(SeedRecord {
        feed_version: feed.version.clone(),
        seeded_at: Utc::now(),
    });
    match sync(feed, store) {
        Ok(report) => Ok(Some(report)),
        Err(err) => {
            // Leave no staged marker behind for a later commit to pick up.
            store.rollback();
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    const E1: &str = "11111111-1111-1111-1111-111111111111";
    const E2: &str = "22222222-2222-2222-2222-222222222222";

    fn record(id: &str, title: &str, updated_at: &str) -> FeedEventRecord {
        FeedEventRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: "A conference".to_string(),
            location: "Berlin".to_string(),
            address: None,
            start_date: "2025-06-01T10:00:00+02:00".to_string(),
            end_date: "2025-06-01T18:00:00+02:00".to_string(),
            event_type: "conference".to_string(),
            notes: None,
            requires_ticket: false,
            requires_registration: false,
            url: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: updated_at.to_string(),
        }
    }

    fn feed(events: Vec<FeedEventRecord>) -> FeedEnvelope {
        FeedEnvelope {
            events,
            last_updated: "2025-06-01T00:00:00Z".to_string(),
            version: "3".to_string(),
        }
    }

    #[test]
    fn new_records_are_created() {
        let mut store = MemoryStore::new();
        let report = sync(&feed(vec![record(E1, "RustFest", "2025-01-01T00:00:00Z")]), &mut store)
            .unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 0);

        let events = store.events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "RustFest");
        assert_eq!(events[0].original_timezone, "UTC+02:00");
        assert!(!events[0].is_attending);
        assert!(!events[0].is_custom_event);
    }

    #[test]
    fn union_semantics_one_new_one_identical() {
        let mut store = MemoryStore::new();
        sync(&feed(vec![record(E2, "Existing", "2025-01-01T00:00:00Z")]), &mut store).unwrap();

        let report = sync(
            &feed(vec![
                record(E1, "Brand new", "2025-01-01T00:00:00Z"),
                record(E2, "Existing", "2025-01-01T00:00:00Z"),
            ]),
            &mut store,
        )
        .unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 0);
        assert_eq!(store.events().unwrap().len(), 2);
    }

    #[test]
    fn resync_of_unchanged_feed_is_a_noop() {
        let batch = feed(vec![
            record(E1, "RustFest", "2025-01-01T00:00:00Z"),
            record(E2, "Meetup", "2025-02-01T00:00:00Z"),
        ]);

        let mut store = MemoryStore::new();
        sync(&batch, &mut store).unwrap();
        let second = sync(&batch, &mut store).unwrap();

        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 0);
        assert_eq!(second.skipped, 0);
    }

    #[test]
    fn newer_timestamp_updates_in_place() {
        let mut store = MemoryStore::new();
        sync(&feed(vec![record(E1, "Old title", "2025-01-01T00:00:00Z")]), &mut store).unwrap();

        let report = sync(
            &feed(vec![record(E1, "New title", "2025-03-01T00:00:00Z")]),
            &mut store,
        )
        .unwrap();

        assert_eq!(report.updated, 1);
        let events = store.events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "New title");
        assert_eq!(
            events[0].updated_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
    }

    // The feed rule is looser than backup import's on purpose: a changed
    // field updates even when the publisher forgot to bump updatedAt.
    #[test]
    fn changed_field_without_newer_timestamp_still_updates() {
        let mut store = MemoryStore::new();
        sync(&feed(vec![record(E1, "Old title", "2025-01-01T00:00:00Z")]), &mut store).unwrap();

        let report = sync(
            &feed(vec![record(E1, "Corrected title", "2025-01-01T00:00:00Z")]),
            &mut store,
        )
        .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(store.events().unwrap()[0].title, "Corrected title");
    }

    #[test]
    fn local_only_state_survives_update() {
        let mut store = MemoryStore::new();
        sync(&feed(vec![record(E1, "RustFest", "2025-01-01T00:00:00Z")]), &mut store).unwrap();

        let mut event = store.events().unwrap().remove(0);
        event.is_attending = true;
        event.wishes.insert(crate::friend::FriendId::generate());
        store.upsert_event(event);
        store.commit().unwrap();

        sync(&feed(vec![record(E1, "RustFest v2", "2025-03-01T00:00:00Z")]), &mut store).unwrap();

        let event = store.events().unwrap().remove(0);
        assert_eq!(event.title, "RustFest v2");
        assert!(event.is_attending);
        assert_eq!(event.wishes.len(), 1);
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let bad_id = record("not-a-uuid", "Bad id", "2025-01-01T00:00:00Z");
        let mut bad_date = record(E2, "Bad date", "2025-01-01T00:00:00Z");
        bad_date.start_date = "whenever".to_string();

        let mut store = MemoryStore::new();
        let report = sync(
            &feed(vec![
                bad_id,
                bad_date,
                record(E1, "Good", "2025-01-01T00:00:00Z"),
            ]),
            &mut store,
        )
        .unwrap();

        assert_eq!(report.skipped, 2);
        assert_eq!(report.created, 1);
        assert_eq!(store.events().unwrap().len(), 1);
    }

    #[test]
    fn sync_never_deletes_local_events() {
        let mut store = MemoryStore::new();
        sync(&feed(vec![record(E1, "Kept", "2025-01-01T00:00:00Z")]), &mut store).unwrap();

        // Next feed no longer contains E1.
        sync(&feed(vec![record(E2, "Other", "2025-01-01T00:00:00Z")]), &mut store).unwrap();

        assert_eq!(store.events().unwrap().len(), 2);
    }

    #[test]
    fn seeding_happens_once() {
        let batch = feed(vec![record(E1, "RustFest", "2025-01-01T00:00:00Z")]);
        let mut store = MemoryStore::new();

        let first = seed_if_needed(&batch, &mut store).unwrap();
        assert!(first.is_some());
        let seed = store.seed_record().unwrap().expect("seed recorded");
        assert_eq!(seed.feed_version, "3");

        let second = seed_if_needed(&batch, &mut store).unwrap();
        assert!(second.is_none());
    }
}
