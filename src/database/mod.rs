pub mod manager;
pub mod models;
pub mod partition;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use partition::PartitionName;
pub use store::{PgTelemetryStore, TelemetryConnection, TelemetryRow, TelemetryStore, TimeWindow};
pub use models::{PayloadKind, RawData, Satellite};
