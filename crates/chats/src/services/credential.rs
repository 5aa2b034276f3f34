//! On-behalf-of credential exchange against the Microsoft identity platform.

use std::time::Duration;

use async_trait::async_trait;
use incontact_config::AzureAdConfig;
use oauth2::basic::BasicTokenResponse;
use oauth2::{AccessToken, ClientId, ClientSecret, TokenResponse, TokenUrl};
use serde::Deserialize;
use tracing::debug;

use crate::types::{ChatResolverError, ChatResult};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Swaps a caller's bearer assertion for a token usable against a downstream API.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self, user_assertion: &str, scope: &str) -> ChatResult<AccessToken>;
}

pub struct OnBehalfOfCredential {
    http: reqwest::Client,
    token_url: TokenUrl,
    client_id: ClientId,
    client_secret: ClientSecret,
}

impl OnBehalfOfCredential {
    pub fn new(
        token_url: TokenUrl,
        client_id: ClientId,
        client_secret: ClientSecret,
        http: reqwest::Client,
    ) -> Self {
        Self {
            http,
            token_url,
            client_id,
            client_secret,
        }
    }

    /// Build the credential for `{authority_host}/{tenant}/oauth2/v2.0/token`.
    pub fn from_config(config: &AzureAdConfig, request_timeout: Duration) -> ChatResult<Self> {
        let tenant_id = required(&config.tenant_id, "azure_ad.tenant_id")?;
        let client_id = required(&config.client_id, "azure_ad.client_id")?;
        let client_secret = required(&config.client_secret, "azure_ad.client_secret")?;

        let token_url = TokenUrl::new(format!(
            "{}/{}/oauth2/v2.0/token",
            config.authority_host.trim_end_matches('/'),
            tenant_id
        ))
        .map_err(|error| {
            ChatResolverError::configuration(format!("invalid authority host: {error}"))
        })?;

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self::new(
            token_url,
            ClientId::new(client_id.to_string()),
            ClientSecret::new(client_secret.to_string()),
            http,
        ))
    }

    pub fn token_url(&self) -> &str {
        self.token_url.as_str()
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> ChatResult<&'a str> {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ChatResolverError::configuration(format!("{key} is not set")))
}

#[async_trait]
impl TokenExchange for OnBehalfOfCredential {
    async fn exchange(&self, user_assertion: &str, scope: &str) -> ChatResult<AccessToken> {
        let params = [
            ("grant_type", JWT_BEARER_GRANT),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.secret().as_str()),
            ("assertion", user_assertion),
            ("scope", scope),
            ("requested_token_use", "on_behalf_of"),
        ];

        let response = self
            .http
            .post(self.token_url.as_str())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorBody>(&body) {
                Ok(error) => match error.error_description {
                    Some(description) => format!("{}: {}", error.error, description),
                    None => error.error,
                },
                Err(_) => format!("identity platform returned {status}: {body}"),
            };
            return Err(ChatResolverError::token_exchange(message));
        }

        let token: BasicTokenResponse = serde_json::from_str(&body).map_err(|error| {
            ChatResolverError::token_exchange(format!("malformed token response: {error}"))
        })?;

        debug!(scope, expires_in = ?token.expires_in(), "obtained on-behalf-of token");
        Ok(token.access_token().clone())
    }
}

#[derive(Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}
