//! Azure Web PubSub service client.

use std::time::Duration;

use async_trait::async_trait;
use incontact_config::WebPubSubConfig;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{RealtimeError, RealtimeResult};
use crate::token::TokenSigner;

/// What a connecting client is allowed to do and which groups it starts in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenRequest {
    pub user_id: Option<String>,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAccessToken {
    pub token: String,
    /// `wss://` address of the hub without credentials.
    pub base_url: String,
    /// `base_url` with the token attached; what a browser client connects to.
    pub url: String,
}

/// Operations the facade needs from the real-time service.
#[async_trait]
pub trait RealtimeClient: Send + Sync {
    async fn client_access_token(&self, request: &ClientTokenRequest) -> RealtimeResult<ClientAccessToken>;

    /// Deliver `message` as text to every connection in `group`.
    async fn send_to_group(&self, group: &str, message: String) -> RealtimeResult<()>;
}

pub struct WebPubSubClient {
    http: reqwest::Client,
    endpoint: String,
    hub: String,
    signer: TokenSigner,
    token_ttl: Duration,
    api_version: String,
}

impl WebPubSubClient {
    pub fn new(endpoint: &str, access_key: &str, hub: &str, http: reqwest::Client) -> Self {
        let defaults = WebPubSubConfig::default();
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            hub: hub.to_string(),
            signer: TokenSigner::new(access_key),
            token_ttl: Duration::from_secs(defaults.token_ttl_minutes * 60),
            api_version: defaults.api_version,
        }
    }

    pub fn from_config(config: &WebPubSubConfig) -> RealtimeResult<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| RealtimeError::configuration("web_pubsub.endpoint is not set"))?;
        let key = config
            .key
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| RealtimeError::configuration("web_pubsub.key is not set"))?;

        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(RealtimeError::configuration(format!(
                "web_pubsub.endpoint must be an http(s) url, got {endpoint}"
            )));
        }

        let mut client = Self::new(endpoint, key, &config.hub, reqwest::Client::new());
        client.token_ttl = Duration::from_secs(config.token_ttl_minutes * 60);
        client.api_version = config.api_version.clone();
        Ok(client)
    }

    pub fn hub(&self) -> &str {
        &self.hub
    }

    fn client_base_url(&self) -> String {
        let socket_endpoint = if let Some(rest) = self.endpoint.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.endpoint.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.endpoint.clone()
        };
        format!("{socket_endpoint}/client/hubs/{}", self.hub)
    }

    fn client_audience(&self) -> String {
        format!("{}/client/hubs/{}", self.endpoint, self.hub)
    }

    fn group_send_url(&self, group: &str) -> String {
        format!(
            "{}/api/hubs/{}/groups/{}/:send",
            self.endpoint,
            urlencoding::encode(&self.hub),
            urlencoding::encode(group)
        )
    }
}

#[async_trait]
impl RealtimeClient for WebPubSubClient {
    async fn client_access_token(&self, request: &ClientTokenRequest) -> RealtimeResult<ClientAccessToken> {
        let token = self.signer.client_token(
            &self.client_audience(),
            request.user_id.as_deref(),
            &request.roles,
            &request.groups,
            self.token_ttl,
        )?;

        let base_url = self.client_base_url();
        let url = format!("{base_url}?access_token={}", urlencoding::encode(&token));

        Ok(ClientAccessToken {
            token,
            base_url,
            url,
        })
    }

    async fn send_to_group(&self, group: &str, message: String) -> RealtimeResult<()> {
        let url = self.group_send_url(group);
        let bearer = self.signer.service_token(&url)?;

        let response = self
            .http
            .post(url.as_str())
            .query(&[("api-version", self.api_version.as_str())])
            .bearer_auth(bearer)
            .header(CONTENT_TYPE, "text/plain")
            .body(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RealtimeError::ServiceStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!(hub = %self.hub, group, status = status.as_u16(), "group send accepted");
        Ok(())
    }
}
