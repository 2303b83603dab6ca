//! Remote feed wire format.
//!
//! The feed is an ephemeral JSON document: a batch of event records plus
//! metadata. Records carry string-encoded dates and ids; parsing them is the
//! syncer's job so that one bad record never sinks the batch.

pub mod source;
pub mod sync;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Top-level feed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEnvelope {
    pub events: Vec<FeedEventRecord>,
    pub last_updated: String,
    pub version: String,
}

/// One event as the feed publishes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEventRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub address: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub event_type: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub requires_ticket: bool,
    pub requires_registration: bool,
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Decode a fetched feed document.
///
/// Only a malformed top-level envelope is fatal; malformed individual
/// records are handled (skipped) during [`sync::sync`].
pub fn decode_feed(bytes: &[u8]) -> Result<FeedEnvelope, SyncError> {
    serde_json::from_slice(bytes).map_err(SyncError::FeedMalformed)
}
