//! Data reconciliation and backup engine for eventbuddy.
//!
//! This crate provides the portable core behind the eventbuddy apps:
//! - `feed::sync` merges a remote event feed into the store without
//!   destroying local edits (additive union, keyed by event id);
//! - `backup::export` serializes the whole store into a versioned package
//!   (JSON plus CSV projections plus README);
//! - `backup::import` restores such a package with last-write-wins conflict
//!   resolution and referential-integrity checking.
//!
//! Storage, feed transport, and file pickers are collaborators behind small
//! traits; see [`store::EntityStore`] and [`feed::source::FeedSource`]. Each
//! operation reads one snapshot and issues exactly one commit, and a store
//! must only ever have one operation running against it at a time.

pub mod backup;
pub mod codec;
pub mod error;
pub mod event;
pub mod feed;
pub mod friend;
pub mod store;

pub use error::{ExportError, ImportError, StoreError, SyncError};
pub use event::{Event, EventId};
pub use friend::{Friend, FriendId};
pub use store::{EntityStore, FileStore, MemoryStore, SeedRecord};
