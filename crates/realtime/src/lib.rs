//! Real-time messaging for InContact: Web PubSub client tokens, group
//! broadcasts, and presence events.

pub mod client;
pub mod errors;
pub mod presence;
pub mod service;
pub mod token;

pub use client::{ClientAccessToken, ClientTokenRequest, RealtimeClient, WebPubSubClient};
pub use errors::{RealtimeError, RealtimeResult};
pub use presence::{PresenceEvent, PresencePayload, PresenceStatus, PRESENCE_GROUP};
pub use service::{normalize_group_name, RealtimeService, CLIENT_ROLES};
