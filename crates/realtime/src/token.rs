//! Access-key JWTs for Azure Web PubSub.
//!
//! Both client connections and the service REST API accept HS256 tokens
//! signed with the hub's access key; they differ only in audience and claims.

use std::time::Duration;

use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::errors::RealtimeResult;

/// Lifetime of tokens attached to REST calls.
const SERVICE_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Claims for a client connection token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientTokenClaims {
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role: Vec<String>,
    #[serde(rename = "webpubsub.group", default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTokenClaims {
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

pub struct TokenSigner {
    key: EncodingKey,
}

impl TokenSigner {
    pub fn new(access_key: &str) -> Self {
        Self {
            key: EncodingKey::from_secret(access_key.as_bytes()),
        }
    }

    pub fn client_token(
        &self,
        audience: &str,
        user_id: Option<&str>,
        roles: &[String],
        groups: &[String],
        ttl: Duration,
    ) -> RealtimeResult<String> {
        let now = get_current_timestamp();
        let claims = ClientTokenClaims {
            aud: audience.to_string(),
            iat: now,
            exp: now + ttl.as_secs(),
            sub: user_id.map(str::to_string),
            role: roles.to_vec(),
            groups: groups.to_vec(),
        };
        Ok(encode(&Header::default(), &claims, &self.key)?)
    }

    /// Bearer token for a REST call; the audience is the request URL without its query.
    pub fn service_token(&self, request_url: &str) -> RealtimeResult<String> {
        let now = get_current_timestamp();
        let claims = ServiceTokenClaims {
            aud: request_url.to_string(),
            iat: now,
            exp: now + SERVICE_TOKEN_TTL.as_secs(),
        };
        Ok(encode(&Header::default(), &claims, &self.key)?)
    }
}
