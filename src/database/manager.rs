use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// SQLSTATE for "relation does not exist"
pub const UNDEFINED_TABLE: &str = "42P01";

/// Errors from the data store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Relation does not exist: {0}")]
    UndefinedTable(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a driver error raised while querying `table`
    pub fn from_query(err: sqlx::Error, table: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNDEFINED_TABLE) => {
                DatabaseError::UndefinedTable(table.to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Owns the connection pool lifecycle: `connect` at startup, `disconnect`
/// once the server has drained.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Build a fixed-size pool (min = max = `connection_number`)
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = Self::connect_options(config)?;

        let pool = PgPoolOptions::new()
            .min_connections(config.connection_number)
            .max_connections(config.connection_number)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!(
            "Created database pool with {} connections",
            config.connection_number
        );
        Ok(pool)
    }

    fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DatabaseError> {
        match &config.url {
            Some(url) => url.parse().map_err(|_| DatabaseError::InvalidDatabaseUrl),
            None => Ok(PgConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .username(&config.user)
                .password(&config.password)
                .database(&config.name)),
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn disconnect(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}
