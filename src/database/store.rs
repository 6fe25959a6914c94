use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tracing::debug;

use super::manager::{DatabaseError, DatabaseManager};
use super::partition::PartitionName;
use super::models::PayloadKind;

/// Stored timestamp column used as the range-query key
pub const TIMESTAMP_COLUMN: &str = "timestampmessage_unix";

/// Authenticity flag column; zero means the row failed the check
pub const AUTHENTICITY_COLUMN: &str = "osnma";

/// A matched partition row, before integrity substitution. `authentic` is
/// false only when the stored flag is zero; a NULL flag counts as authentic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryRow {
    pub authentic: bool,
    pub payload: Option<String>,
}

/// Inclusive range of stored timestamps to search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub requested: i64,
    pub lower: i64,
    pub upper: i64,
}

impl TimeWindow {
    pub fn around(requested: i64, tolerance: i64) -> Self {
        Self {
            requested,
            lower: requested.saturating_sub(tolerance),
            upper: requested.saturating_add(tolerance),
        }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        (self.lower..=self.upper).contains(&timestamp)
    }
}

/// Source of pooled connections to the partitioned telemetry tables
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Check out one connection; it returns to the pool when dropped
    async fn acquire(&self) -> Result<Box<dyn TelemetryConnection>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait TelemetryConnection: Send {
    /// Fetch one row of `partition` whose stored timestamp lies in `window`.
    ///
    /// A missing partition surfaces as `DatabaseError::UndefinedTable`.
    async fn fetch_window(
        &mut self,
        partition: &PartitionName,
        kind: PayloadKind,
        window: TimeWindow,
    ) -> Result<Option<TelemetryRow>, DatabaseError>;
}

/// PostgreSQL-backed telemetry store
#[derive(Clone)]
pub struct PgTelemetryStore {
    pool: PgPool,
}

impl PgTelemetryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TelemetryStore for PgTelemetryStore {
    async fn acquire(&self) -> Result<Box<dyn TelemetryConnection>, DatabaseError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        Ok(Box::new(PgTelemetryConnection { conn }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

struct PgTelemetryConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl TelemetryConnection for PgTelemetryConnection {
    async fn fetch_window(
        &mut self,
        partition: &PartitionName,
        kind: PayloadKind,
        window: TimeWindow,
    ) -> Result<Option<TelemetryRow>, DatabaseError> {
        let sql = window_query(partition, kind);
        debug!("Querying {} for {:?}", partition, window);

        let row: Option<(bool, Option<String>)> = sqlx::query_as(&sql)
            .bind(window.lower)
            .bind(window.upper)
            .bind(window.requested)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| DatabaseError::from_query(e, partition.as_str()))?;

        Ok(row.map(|(authentic, payload)| TelemetryRow { authentic, payload }))
    }
}

/// Range lookup against one partition. The table identifier is validated
/// and quoted; every value is a bound parameter. Ties inside the window go
/// to the row closest to the requested timestamp, then the earliest one.
/// The flag is compared in its stored type, never narrowed.
fn window_query(partition: &PartitionName, kind: PayloadKind) -> String {
    format!(
        "SELECT COALESCE({flag} <> 0, true) AS authentic, {payload}::text AS payload \
         FROM {table} \
         WHERE {ts} BETWEEN $1 AND $2 \
         ORDER BY abs({ts} - $3), {ts} \
         LIMIT 1",
        flag = AUTHENTICITY_COLUMN,
        payload = kind.column(),
        table = partition.quoted(),
        ts = TIMESTAMP_COLUMN,
    )
}
