//! Presence and group messaging facade over a [`RealtimeClient`].

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::client::{ClientTokenRequest, RealtimeClient};
use crate::errors::{RealtimeError, RealtimeResult};
use crate::presence::{PresenceEvent, PresencePayload, PRESENCE_GROUP};

/// Roles granted to browser clients: join/leave groups and receive, never publish.
pub const CLIENT_ROLES: [&str; 2] = ["webpubsub.joinLeaveGroup", "webpubsub.receive"];

/// Trim and lowercase a group name so that `Alice@Example.com ` and
/// `alice@example.com` address the same group.
///
/// ```
/// use incontact_realtime::normalize_group_name;
///
/// assert_eq!(normalize_group_name(" Alice@Example.com "), "alice@example.com");
/// ```
pub fn normalize_group_name(group_name: &str) -> String {
    group_name.trim().to_lowercase()
}

#[derive(Clone)]
pub struct RealtimeService {
    client: Arc<dyn RealtimeClient>,
}

impl RealtimeService {
    pub fn new(client: Arc<dyn RealtimeClient>) -> Self {
        Self { client }
    }

    /// Mint a client token for `group_name`, pre-joined to that group and to
    /// the presence group. The normalized name doubles as the user id.
    pub async fn generate_web_pubsub_token(&self, group_name: &str) -> RealtimeResult<String> {
        let normalized = normalize_group_name(group_name);
        if normalized.is_empty() {
            return Err(RealtimeError::InvalidGroup {
                reason: "group name is empty".to_string(),
            });
        }

        let request = ClientTokenRequest {
            user_id: Some(normalized.clone()),
            roles: CLIENT_ROLES.iter().map(|role| role.to_string()).collect(),
            groups: vec![normalized, PRESENCE_GROUP.to_string()],
        };

        let issued = self.client.client_access_token(&request).await?;
        Ok(issued.token)
    }

    /// Serialize `payload` as JSON and send it to every member of `group_name`.
    pub async fn send_to_group<T>(&self, group_name: &str, payload: &T) -> RealtimeResult<()>
    where
        T: Serialize + ?Sized,
    {
        let message = serde_json::to_string(payload)?;
        self.client.send_to_group(group_name, message.clone()).await?;
        debug!(group = group_name, payload = %message, "broadcast to group");
        Ok(())
    }

    /// Publish a presence change to the presence group.
    pub async fn broadcast_presence(&self, payload: &PresencePayload) -> RealtimeResult<()> {
        let message = serde_json::to_string(&PresenceEvent::new(payload))?;
        self.client.send_to_group(PRESENCE_GROUP, message.clone()).await?;
        debug!(
            email = %payload.email,
            status = ?payload.status,
            event = %message,
            "presence broadcast"
        );
        Ok(())
    }
}
