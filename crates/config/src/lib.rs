use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "incontact.toml",
    "config/incontact.toml",
    "crates/config/incontact.toml",
    "../incontact.toml",
    "../config/incontact.toml",
];

/// Plain environment names set by the hosting platform, mapped onto config keys.
/// These win over files and `INCONTACT__*` overrides.
const PLATFORM_ENV_KEYS: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("AZURE_TENANT_ID", "azure_ad.tenant_id"),
    ("AZURE_CLIENT_ID", "azure_ad.client_id"),
    ("AZURE_CLIENT_SECRET", "azure_ad.client_secret"),
    ("WEBPUBSUB_ENDPOINT", "web_pubsub.endpoint"),
    ("WEBPUBSUB_KEY", "web_pubsub.key"),
    ("WEBPUBSUB_HUB_NAME", "web_pubsub.hub"),
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub azure_ad: AzureAdConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub web_pubsub: WebPubSubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://incontact.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Entra ID application registration used for the on-behalf-of exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureAdConfig {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "AzureAdConfig::default_authority_host")]
    pub authority_host: String,
}

impl AzureAdConfig {
    fn default_authority_host() -> String {
        "https://login.microsoftonline.com".to_string()
    }
}

impl Default for AzureAdConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_secret: None,
            authority_host: Self::default_authority_host(),
        }
    }
}

/// Microsoft Graph endpoint settings.
///
/// ```
/// use incontact_config::GraphConfig;
///
/// let graph = GraphConfig::default();
/// assert_eq!(graph.base_url, "https://graph.microsoft.com/v1.0");
/// assert_eq!(graph.scope, "https://graph.microsoft.com/.default");
/// assert_eq!(graph.request_timeout_seconds, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "GraphConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "GraphConfig::default_scope")]
    pub scope: String,
    #[serde(default = "GraphConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl GraphConfig {
    fn default_base_url() -> String {
        "https://graph.microsoft.com/v1.0".to_string()
    }

    fn default_scope() -> String {
        "https://graph.microsoft.com/.default".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            scope: Self::default_scope(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebPubSubConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "WebPubSubConfig::default_hub")]
    pub hub: String,
    #[serde(default = "WebPubSubConfig::default_token_ttl")]
    pub token_ttl_minutes: u64,
    #[serde(default = "WebPubSubConfig::default_api_version")]
    pub api_version: String,
}

impl WebPubSubConfig {
    fn default_hub() -> String {
        "incontact".to_string()
    }

    const fn default_token_ttl() -> u64 {
        60
    }

    fn default_api_version() -> String {
        "2024-01-01".to_string()
    }
}

impl Default for WebPubSubConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            key: None,
            hub: Self::default_hub(),
            token_ttl_minutes: Self::default_token_ttl(),
            api_version: Self::default_api_version(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use incontact_config::load;
///
/// std::env::remove_var("INCONTACT_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.database.url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("azure_ad.authority_host", defaults.azure_ad.authority_host.clone())?
        .set_default("graph.base_url", defaults.graph.base_url.clone())?
        .set_default("graph.scope", defaults.graph.scope.clone())?
        .set_default(
            "graph.request_timeout_seconds",
            i64::try_from(defaults.graph.request_timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("web_pubsub.hub", defaults.web_pubsub.hub.clone())?
        .set_default(
            "web_pubsub.token_ttl_minutes",
            i64::try_from(defaults.web_pubsub.token_ttl_minutes).unwrap_or(i64::MAX),
        )?
        .set_default("web_pubsub.api_version", defaults.web_pubsub.api_version.clone())?;

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("INCONTACT_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via INCONTACT_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(config::Environment::with_prefix("INCONTACT").separator("__"));

    for (variable, key) in PLATFORM_ENV_KEYS {
        let value = std::env::var(variable).ok().filter(|value| !value.is_empty());
        builder = builder.set_override_option(*key, value)?;
    }

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(
        database = %config.database.url,
        hub = %config.web_pubsub.hub,
        graph = %config.graph.base_url,
        "loaded integration configuration"
    );
    Ok(config)
}
