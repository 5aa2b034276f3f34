use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use incontact_chats::{ChatResolver, GraphClient, OnBehalfOfCredential};
use incontact_config::AppConfig;
use incontact_database::{initialize_database, ChatRepository};
use incontact_realtime::{RealtimeService, WebPubSubClient};
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Process-wide handles a hosting layer needs to serve chat and presence requests.
#[derive(Clone)]
pub struct IntegrationServices {
    pub db_pool: SqlitePool,
    pub chat_resolver: Arc<ChatResolver>,
    pub realtime: RealtimeService,
}

impl IntegrationServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to prepare chat database")?;

        let credential = OnBehalfOfCredential::from_config(
            &config.azure_ad,
            Duration::from_secs(config.graph.request_timeout_seconds),
        )
        .context("failed to configure on-behalf-of credential")?;
        let graph = GraphClient::from_config(&config.graph)
            .context("failed to configure graph client")?;

        let chat_resolver = Arc::new(ChatResolver::new(
            Arc::new(ChatRepository::new(db_pool.clone())),
            Arc::new(credential),
            Arc::new(graph),
            config.graph.scope.clone(),
        ));

        let pubsub = WebPubSubClient::from_config(&config.web_pubsub)
            .context("failed to configure web pubsub client")?;
        let realtime = RealtimeService::new(Arc::new(pubsub));

        info!(
            hub = %config.web_pubsub.hub,
            graph = %config.graph.base_url,
            "integration services ready"
        );

        Ok(Self {
            db_pool,
            chat_resolver,
            realtime,
        })
    }
}
