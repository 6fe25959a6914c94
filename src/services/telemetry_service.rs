use std::sync::Arc;
use tracing::{debug, error};

use crate::database::{
    DatabaseError, PartitionName, PayloadKind, RawData, Satellite, TelemetryConnection,
    TelemetryRow, TelemetryStore, TimeWindow,
};

/// Payload delivered in place of the stored data when a row failed
/// navigation-message authentication
pub const ATTACK_ON_REFERENCE_SYSTEM: &str = "AttackOnReferenceSystem";

/// Matching tolerance around a requested timestamp, in ms
pub const TOLERANCE_MS: i64 = 1000;

/// Replace the payload with the attack sentinel when the row failed the
/// authenticity check; otherwise pass the stored payload through.
pub fn apply_integrity(row: TelemetryRow) -> Option<String> {
    if row.authentic {
        row.payload
    } else {
        Some(ATTACK_ON_REFERENCE_SYSTEM.to_string())
    }
}

/// Resolves requested timestamps of a satellite into stored payloads
pub struct TelemetryService {
    store: Arc<dyn TelemetryStore>,
    nation: String,
}

impl TelemetryService {
    pub fn new(store: Arc<dyn TelemetryStore>, nation: impl Into<String>) -> Self {
        Self {
            store,
            nation: nation.into(),
        }
    }

    pub fn nation(&self) -> &str {
        &self.nation
    }

    /// Ping the underlying store
    pub async fn health(&self) -> Result<(), DatabaseError> {
        self.store.ping().await
    }

    /// Look up the payload for one timestamp on an already checked-out
    /// connection. A missing partition or an empty window yields `None`;
    /// any other store failure is returned.
    pub async fn fetch(
        &self,
        conn: &mut dyn TelemetryConnection,
        kind: PayloadKind,
        satellite_id: u32,
        timestamp_ms: i64,
    ) -> Result<Option<String>, DatabaseError> {
        let Some(partition) = PartitionName::resolve(&self.nation, satellite_id, timestamp_ms)
        else {
            debug!("No partition for satellite {} at {}", satellite_id, timestamp_ms);
            return Ok(None);
        };

        let window = TimeWindow::around(timestamp_ms, TOLERANCE_MS);
        match conn.fetch_window(&partition, kind, window).await {
            Ok(row) => Ok(row.and_then(apply_integrity)),
            Err(DatabaseError::UndefinedTable(table)) => {
                debug!("Partition {} does not exist", table);
                Ok(None)
            }
            Err(e) => {
                error!("Lookup on {} failed: {}", partition, e);
                Err(e)
            }
        }
    }

    /// Resolve a single timestamp, echoing it back with its payload
    pub async fn resolve_one(
        &self,
        kind: PayloadKind,
        satellite_id: u32,
        timestamp_ms: i64,
    ) -> Result<RawData, DatabaseError> {
        let mut conn = self.store.acquire().await?;
        let raw_data = self
            .fetch(conn.as_mut(), kind, satellite_id, timestamp_ms)
            .await?;

        Ok(RawData {
            timestamp: timestamp_ms,
            raw_data,
        })
    }

    /// Resolve every entry of `satellite.info` in order on one connection.
    /// Timestamps are left as requested; only payloads are filled in.
    pub async fn resolve_all(
        &self,
        kind: PayloadKind,
        mut satellite: Satellite,
    ) -> Result<Satellite, DatabaseError> {
        if satellite.info.is_empty() {
            return Ok(satellite);
        }

        let mut conn = self.store.acquire().await?;
        for entry in satellite.info.iter_mut() {
            entry.raw_data = self
                .fetch(conn.as_mut(), kind, satellite.satellite_id, entry.timestamp)
                .await?;
        }

        debug!(
            "Resolved {} entries for satellite {}",
            satellite.info.len(),
            satellite.satellite_id
        );
        Ok(satellite)
    }
}
