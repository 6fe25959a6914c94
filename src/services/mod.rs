pub mod telemetry_service;

pub use telemetry_service::{
    apply_integrity, TelemetryService, ATTACK_ON_REFERENCE_SYSTEM, TOLERANCE_MS,
};
