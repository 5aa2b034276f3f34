//! Presence events broadcast to every connected client.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Name of the group every client token is pre-joined to.
pub const PRESENCE_GROUP: &str = "presence";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub email: String,
    pub full_name: String,
    pub status: PresenceStatus,
    /// Kept in the caller's offset; `+02:00` goes back out as `+02:00`.
    pub last_seen_at: DateTime<FixedOffset>,
}

/// Envelope sent on the wire: `{ "type": "presence", "user": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenceEvent<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub user: &'a PresencePayload,
}

impl<'a> PresenceEvent<'a> {
    pub fn new(user: &'a PresencePayload) -> Self {
        Self {
            kind: PRESENCE_GROUP,
            user,
        }
    }
}
