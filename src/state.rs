use std::sync::Arc;

use crate::auth::CredentialValidator;
use crate::services::TelemetryService;

/// Per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<TelemetryService>,
    pub validator: Arc<CredentialValidator>,
}

impl AppState {
    pub fn new(telemetry: TelemetryService, validator: CredentialValidator) -> Self {
        Self {
            telemetry: Arc::new(telemetry),
            validator: Arc::new(validator),
        }
    }
}
