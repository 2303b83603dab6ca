//! Backup package assembly.
//!
//! Five sequential stages over one snapshot: fetch, envelope build, JSON
//! encoding, CSV projections, package write. Later stages reuse the same
//! snapshot so the JSON, the CSVs, and the README can never disagree. Any
//! stage failure aborts the whole export; partial files may remain on disk
//! but no location is returned for them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::backup::{
    BackupEnvelope, EventExportRecord, FriendExportRecord, RelationshipEdge, Relationships,
    BACKUP_FILENAME, BACKUP_VERSION,
};
use crate::codec::csv::CsvWriter;
use crate::codec::dates;
use crate::error::ExportError;
use crate::event::Event;
use crate::friend::{Friend, FriendId};
use crate::store::EntityStore;

pub const EVENTS_CSV: &str = "events.csv";
pub const FRIENDS_CSV: &str = "friends.csv";
pub const README_FILENAME: &str = "README.txt";

const EVENT_COLUMNS: &[&str] = &[
    "ID",
    "Title",
    "Description",
    "Location",
    "Address",
    "Start Date",
    "End Date",
    "Event Type",
    "Notes",
    "Requires Ticket",
    "Requires Registration",
    "URL",
    "Is Attending",
    "Is Custom Event",
    "Created At",
    "Updated At",
    "Attendee Count",
    "Wish Count",
];

const FRIEND_COLUMNS: &[&str] = &[
    "ID",
    "Name",
    "Email",
    "Phone",
    "Job Title",
    "Company",
    "Notes",
    "Is Favorite",
    "Created At",
    "Updated At",
    "Events Count",
    "Wish Events Count",
    "Social Media",
];

/// Location of a finished export package.
#[derive(Debug, Clone)]
pub struct ExportedPackage {
    pub dir: PathBuf,
    pub backup_json: PathBuf,
    pub events_csv: PathBuf,
    pub friends_csv: PathBuf,
    pub readme: PathBuf,
}

/// Serialize the full store into a package directory under `dest`.
pub fn export_all<S: EntityStore>(
    store: &S,
    dest: &Path,
) -> Result<ExportedPackage, ExportError> {
    export_all_with_progress(store, dest, |_| {})
}

/// Same as [`export_all`], reporting a monotonically increasing fraction at
/// each stage boundary. Advisory only: the callback has no effect on the
/// pipeline.
pub fn export_all_with_progress<S: EntityStore>(
    store: &S,
    dest: &Path,
    mut progress: impl FnMut(f32),
) -> Result<ExportedPackage, ExportError> {
    // Stage 1: one snapshot read feeds every later stage. Sorted by id so
    // output never depends on store iteration order.
    let mut events = store.events()?;
    let mut friends = store.friends()?;
    events.sort_by_key(|e| e.id);
    friends.sort_by_key(|f| f.id);
    progress(0.2);

    // Stage 2: envelope.
    let export_date = Utc::now();
    let envelope = build_envelope(&events, &friends, export_date);
    progress(0.4);

    // Stage 3: JSON.
    let json = encode_envelope(&envelope)?;
    progress(0.6);

    // Stage 4: CSV projections.
    let events_csv = render_events_csv(&events);
    let friends_csv = render_friends_csv(&friends, &events);
    progress(0.8);

    // Stage 5: package directory.
    let dir = dest.join(format!(
        "EventBuddy_Export_{}",
        dates::package_timestamp(&export_date)
    ));
    fs::create_dir_all(&dir).map_err(|e| ExportError::write(&dir, e))?;

    let package = ExportedPackage {
        backup_json: dir.join(BACKUP_FILENAME),
        events_csv: dir.join(EVENTS_CSV),
        friends_csv: dir.join(FRIENDS_CSV),
        readme: dir.join(README_FILENAME),
        dir,
    };
    write_file(&package.backup_json, &json)?;
    write_file(&package.events_csv, &events_csv)?;
    write_file(&package.friends_csv, &friends_csv)?;
    write_file(&package.readme, &render_readme(&export_date))?;
    progress(1.0);

    Ok(package)
}

fn build_envelope(
    events: &[Event],
    friends: &[Friend],
    export_date: DateTime<Utc>,
) -> BackupEnvelope {
    // Each attendee/wish entry becomes exactly one edge.
    let mut relationships = Relationships::default();
    for event in events {
        for friend_id in &event.attendees {
            relationships.event_attendees.push(RelationshipEdge {
                event_id: event.id,
                friend_id: *friend_id,
            });
        }
        for friend_id in &event.wishes {
            relationships.event_wishes.push(RelationshipEdge {
                event_id: event.id,
                friend_id: *friend_id,
            });
        }
    }

    BackupEnvelope {
        export_date,
        version: BACKUP_VERSION.to_string(),
        events: events.iter().map(EventExportRecord::from_event).collect(),
        friends: friends.iter().map(FriendExportRecord::from_friend).collect(),
        relationships,
    }
}

/// Pretty-printed JSON with sorted object keys. serde_json's `Value` keeps
/// objects in a `BTreeMap`, so round-tripping through it sorts every key.
fn encode_envelope(envelope: &BackupEnvelope) -> Result<String, ExportError> {
    let value = serde_json::to_value(envelope).map_err(ExportError::Encode)?;
    serde_json::to_string_pretty(&value).map_err(ExportError::Encode)
}

fn yes_no(value: bool) -> String {
    let text = if value { "Yes" } else { "No" };
    text.to_string()
}

fn render_events_csv(events: &[Event]) -> String {
    let mut csv = CsvWriter::with_header(EVENT_COLUMNS);
    for event in events {
        csv.write_row(&[
            event.id.to_string(),
            event.title.clone(),
            event.description.clone(),
            event.location.clone(),
            event.address.clone().unwrap_or_default(),
            dates::render_datetime(&event.start_date),
            dates::render_datetime(&event.end_date),
            event.event_type.clone(),
            event.notes.clone().unwrap_or_default(),
            yes_no(event.requires_ticket),
            yes_no(event.requires_registration),
            event.url.clone().unwrap_or_default(),
            yes_no(event.is_attending),
            yes_no(event.is_custom_event),
            dates::render_datetime(&event.created_at),
            dates::render_datetime(&event.updated_at),
            event.attendees.len().to_string(),
            event.wishes.len().to_string(),
        ]);
    }
    csv.finish()
}

fn render_friends_csv(friends: &[Friend], events: &[Event]) -> String {
    // Friend-side counts are derived from the event-owned edge sets.
    let mut attending: HashMap<FriendId, usize> = HashMap::new();
    let mut wishing: HashMap<FriendId, usize> = HashMap::new();
    for event in events {
        for friend_id in &event.attendees {
            *attending.entry(*friend_id).or_default() += 1;
        }
        for friend_id in &event.wishes {
            *wishing.entry(*friend_id).or_default() += 1;
        }
    }

    let mut csv = CsvWriter::with_header(FRIEND_COLUMNS);
    for friend in friends {
        // BTreeMap iteration gives the sorted key order the byte-stable
        // output needs.
        let social = friend
            .social_handles
            .iter()
            .map(|(platform, handle)| format!("{platform}:{handle}"))
            .collect::<Vec<_>>()
            .join("; ");

        csv.write_row(&[
            friend.id.to_string(),
            friend.name.clone(),
            friend.email.clone().unwrap_or_default(),
            friend.phone.clone().unwrap_or_default(),
            friend.job_title.clone().unwrap_or_default(),
            friend.company.clone().unwrap_or_default(),
            friend.notes.clone().unwrap_or_default(),
            yes_no(friend.is_favorite),
            dates::render_datetime(&friend.created_at),
            dates::render_datetime(&friend.updated_at),
            attending.get(&friend.id).copied().unwrap_or(0).to_string(),
            wishing.get(&friend.id).copied().unwrap_or(0).to_string(),
            social,
        ]);
    }
    csv.finish()
}

fn render_readme(export_date: &DateTime<Utc>) -> String {
    format!(
        "EventBuddy Export\n\
         =================\n\
         \n\
         Exported: {}\n\
         Backup version: {}\n\
         \n\
         Contents:\n\
         \n\
         {BACKUP_FILENAME}\n\
         \x20   Full backup: every event and friend plus the relationships\n\
         \x20   between them. Import this file (or this folder) to restore.\n\
         \n\
         {EVENTS_CSV}, {FRIENDS_CSV}\n\
         \x20   Spreadsheet-friendly projections of the same snapshot. They\n\
         \x20   are read-only copies; the JSON document is the authoritative\n\
         \x20   one.\n",
        dates::render_datetime(export_date),
        BACKUP_VERSION,
    )
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    fs::write(path, content).map_err(|e| ExportError::write(path, e))
}
