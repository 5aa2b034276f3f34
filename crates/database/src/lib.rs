//! InContact Database Crate
//!
//! Local persistence for resolved chat mappings: pool preparation, embedded
//! migrations, and the chat repository.

use incontact_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::{ping, prepare_database};
pub use entities::{ChatRecord, CreateChatRecord};
pub use migrations::run_migrations;
pub use repos::ChatRepository;
pub use types::{DatabaseError, DatabaseResult};

/// Open the pool and bring the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
