use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::database::{
    DatabaseError, PartitionName, PayloadKind, TelemetryConnection, TelemetryRow, TelemetryStore,
    TimeWindow,
};

/// One stored row of a test partition
#[derive(Debug, Clone)]
pub struct StoredRow {
    pub timestamp: i64,
    pub osnma: i64,
    pub raw_data: Option<String>,
    pub galileo_data: Option<String>,
}

impl StoredRow {
    pub fn new(timestamp: i64, osnma: i64, raw_data: &str) -> Self {
        Self {
            timestamp,
            osnma,
            raw_data: Some(raw_data.to_string()),
            galileo_data: Some(format!("galileo:{}", raw_data)),
        }
    }
}

#[derive(Default)]
struct Inner {
    partitions: HashMap<String, Vec<StoredRow>>,
    fault: Option<String>,
    acquired: usize,
    open: usize,
    queries: usize,
}

/// In-memory telemetry store that behaves like the partitioned tables:
/// unknown partitions report `UndefinedTable`, and checked-out connections
/// are counted so tests can assert they are released.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create the partition if needed and append a row to it
    pub fn insert(&self, partition: &str, row: StoredRow) -> &Self {
        self.lock()
            .partitions
            .entry(partition.to_string())
            .or_default()
            .push(row);
        self
    }

    /// Every subsequent query fails the way a driver error surfaces
    pub fn fail_queries(&self, message: &str) {
        self.lock().fault = Some(message.to_string());
    }

    pub fn acquired(&self) -> usize {
        self.lock().acquired
    }

    pub fn open_connections(&self) -> usize {
        self.lock().open
    }

    pub fn queries(&self) -> usize {
        self.lock().queries
    }
}

#[async_trait]
impl TelemetryStore for MemoryStore {
    async fn acquire(&self) -> Result<Box<dyn TelemetryConnection>, DatabaseError> {
        let mut inner = self.lock();
        inner.acquired += 1;
        inner.open += 1;
        Ok(Box::new(MemoryConnection {
            store: self.clone(),
        }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        match &self.lock().fault {
            Some(message) => Err(DatabaseError::ConnectionError(message.clone())),
            None => Ok(()),
        }
    }
}

struct MemoryConnection {
    store: MemoryStore,
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.store.lock().open -= 1;
    }
}

#[async_trait]
impl TelemetryConnection for MemoryConnection {
    async fn fetch_window(
        &mut self,
        partition: &PartitionName,
        kind: PayloadKind,
        window: TimeWindow,
    ) -> Result<Option<TelemetryRow>, DatabaseError> {
        let mut inner = self.store.lock();
        inner.queries += 1;

        if let Some(message) = &inner.fault {
            return Err(DatabaseError::Sqlx(sqlx::Error::Protocol(message.clone())));
        }

        let rows = inner
            .partitions
            .get(partition.as_str())
            .ok_or_else(|| DatabaseError::UndefinedTable(partition.to_string()))?;

        let best = rows
            .iter()
            .filter(|row| window.contains(row.timestamp))
            .min_by_key(|row| ((row.timestamp - window.requested).abs(), row.timestamp));

        Ok(best.map(|row| TelemetryRow {
            authentic: row.osnma != 0,
            payload: match kind {
                PayloadKind::Ublox => row.raw_data.clone(),
                PayloadKind::Galileo => row.galileo_data.clone(),
            },
        }))
    }
}
