//! SQLite pool preparation

use anyhow::{Context, Result};
use incontact_config::DatabaseConfig;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tokio::fs;
use tracing::info;

const SQLITE_PRAGMAS: &[(&str, &str)] = &[
    ("PRAGMA foreign_keys = ON", "failed to enable foreign keys for sqlite"),
    ("PRAGMA journal_mode = WAL", "failed to enable WAL mode for sqlite"),
    ("PRAGMA busy_timeout = 5000", "failed to set busy timeout for sqlite"),
];

/// Open the pool described by `config`, creating the SQLite file if needed.
pub async fn prepare_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    ensure_sqlite_path(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .with_context(|| format!("failed to connect to database {}", config.url))?;

    for (pragma, failure) in SQLITE_PRAGMAS {
        sqlx::query(pragma)
            .execute(&pool)
            .await
            .context(*failure)?;
    }

    info!(url = %config.url, "database connection established");
    Ok(pool)
}

/// Round-trip a trivial query to check the pool is usable.
pub async fn ping(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("failed to reach database")?;
    Ok(())
}

/// Filesystem path named by a sqlite URL, if it names one.
///
/// Accepts both `sqlite://path` and `sqlite:path` and drops any `?mode=...`
/// style options. In-memory databases yield `None`.
fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);

    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path))
}

async fn ensure_sqlite_path(url: &str) -> Result<()> {
    let Some(path) = sqlite_file_path(url) else {
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory for chat store {}", parent.display()))?;
    }

    if !fs::try_exists(path).await.unwrap_or(false) {
        fs::File::create(path)
            .await
            .with_context(|| format!("failed to create chat store file {}", path.display()))?;
        info!(path = %path.display(), "created sqlite chat store");
    }

    Ok(())
}
