#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use galileo_api::auth::{CredentialValidator, JwtVerifier};
use galileo_api::database::{
    DatabaseError, PartitionName, PayloadKind, TelemetryConnection, TelemetryRow, TelemetryStore,
    TimeWindow,
};
use galileo_api::services::TelemetryService;
use galileo_api::AppState;

pub const PRIVATE_KEY: &str = include_str!("../fixtures/test_rsa_private.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/test_rsa_public.pem");
pub const ISSUER: &str = "Travis-ci/test";
pub const AUDIENCE: &str = "Travis-ci/test";

pub const NATION: &str = "Italy";
pub const SATELLITE_ID: u32 = 18;
pub const TIMESTAMP: i64 = 1_584_609_710;
pub const RAW_DATA: &str = "02132c000224010009080200afe20702188a1e3ce838b8d80000fa90004037842a000000f377aaaa00403fdabdaaaa2ac260";
pub const GALILEO_DATA: &str = "0a2b3c4d5e6f";

/// (timestamp, osnma, raw_data, galileo_data)
type Row = (i64, i64, String, String);

/// Partitioned telemetry tables held in memory
#[derive(Clone, Default)]
pub struct FakeStore {
    partitions: Arc<Mutex<HashMap<String, Vec<Row>>>>,
    down: Arc<AtomicBool>,
}

impl FakeStore {
    pub fn insert(&self, partition: &str, timestamp: i64, osnma: i64, raw: &str, galileo: &str) {
        self.partitions
            .lock()
            .unwrap()
            .entry(partition.to_string())
            .or_default()
            .push((timestamp, osnma, raw.to_string(), galileo.to_string()));
    }

    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TelemetryStore for FakeStore {
    async fn acquire(&self) -> Result<Box<dyn TelemetryConnection>, DatabaseError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionError("pool timed out".to_string()));
        }
        Ok(Box::new(self.clone()))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TelemetryConnection for FakeStore {
    async fn fetch_window(
        &mut self,
        partition: &PartitionName,
        kind: PayloadKind,
        window: TimeWindow,
    ) -> Result<Option<TelemetryRow>, DatabaseError> {
        let partitions = self.partitions.lock().unwrap();
        let rows = partitions
            .get(partition.as_str())
            .ok_or_else(|| DatabaseError::UndefinedTable(partition.to_string()))?;

        Ok(rows
            .iter()
            .find(|(ts, ..)| window.contains(*ts))
            .map(|(_, osnma, raw, galileo)| TelemetryRow {
                authentic: *osnma != 0,
                payload: Some(match kind {
                    PayloadKind::Ublox => raw.clone(),
                    PayloadKind::Galileo => galileo.clone(),
                }),
            }))
    }
}

/// Store seeded with the reference row: satellite 18, authenticity failed
pub fn seeded_store() -> FakeStore {
    let store = FakeStore::default();
    let partition = PartitionName::resolve(NATION, SATELLITE_ID, TIMESTAMP).unwrap();
    store.insert(partition.as_str(), TIMESTAMP, 0, RAW_DATA, GALILEO_DATA);
    store
}

/// Base64 body of the public key, the way realm keys are configured
pub fn realm_public_key() -> String {
    PUBLIC_KEY
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect()
}

pub fn app(store: FakeStore) -> Router {
    let verifier = JwtVerifier::new("RS256", &realm_public_key(), ISSUER, AUDIENCE)
        .expect("fixture key must load");
    let validator = CredentialValidator::new(verifier, Duration::from_secs(180), 16);
    let telemetry = TelemetryService::new(Arc::new(store), NATION);
    galileo_api::app(AppState::new(telemetry, validator))
}

fn sign(exp_offset: i64, iat_offset: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "exp": now + exp_offset,
        "iat": now + iat_offset,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "realm_access": { "roles": ["Test"] }
    });
    encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).expect("fixture key must parse"),
    )
    .expect("token encode should succeed")
}

pub fn valid_token() -> String {
    sign(300, 0)
}

pub fn expired_token() -> String {
    sign(-300, -600)
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body must be JSON")
    };
    (status, body)
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, authorization: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
