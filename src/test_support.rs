//! Test doubles and token helpers shared by the unit tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::app::build_router;
use crate::middleware::http::HttpLimits;
use crate::repos::{
    DomainRecord, MemoryRecordStore, NewRecord, RecordStore, error::RepoError,
};
use crate::services::{
    audit::{AuditError, AuditRecord, AuditSink},
    auth::{
        ClaimSet, ClaimsValidator, TokenValidator, ValidationError,
        trust_policy::{KeyMaterial, TrustPolicy},
    },
    id_codec::IdCodec,
};
use crate::state::AppState;

pub const SECRET: &[u8] = b"secret";
pub const ISSUER: &str = "myissuer";
pub const AUDIENCE: &str = "myaudience";

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn id_codec() -> IdCodec {
    IdCodec::new(10, ALPHABET).unwrap()
}

pub fn claims_validator() -> ClaimsValidator {
    let policy = TrustPolicy::new(
        Algorithm::HS256,
        KeyMaterial::Secret(SECRET),
        ISSUER,
        [AUDIENCE],
        0,
    )
    .unwrap();
    ClaimsValidator::new(Arc::new(policy))
}

/// Claims accepted by `claims_validator()` for the next ten minutes.
pub fn valid_claims(subject: &str) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": ISSUER,
        "aud": [AUDIENCE],
        "sub": subject,
        "iat": now,
        "exp": now + 600,
    })
}

pub fn mint(claims: &Value, secret: &[u8]) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl RecordingAuditSink {
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn append(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        Err(AuditError::Db(sqlx::Error::PoolTimedOut))
    }
}

pub struct FailingRecordStore;

#[async_trait]
impl RecordStore for FailingRecordStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn create(&self, _record: NewRecord) -> Result<DomainRecord, RepoError> {
        Err(RepoError::Db(sqlx::Error::PoolClosed))
    }

    async fn get(&self, _id: i64) -> Result<Option<DomainRecord>, RepoError> {
        Err(RepoError::Db(sqlx::Error::PoolClosed))
    }

    async fn list(&self, _limit: i64, _offset: i64) -> Result<Vec<DomainRecord>, RepoError> {
        Err(RepoError::Db(sqlx::Error::PoolClosed))
    }
}

/// Wraps the real validator and counts invocations.
pub struct CountingValidator {
    inner: ClaimsValidator,
    calls: AtomicUsize,
}

impl CountingValidator {
    pub fn new(inner: ClaimsValidator) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenValidator for CountingValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, ValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.validate(token, now)
    }
}

/// Application wired with in-memory collaborators the test can inspect.
pub struct TestApp {
    pub state: AppState,
    pub records: Arc<MemoryRecordStore>,
    pub audit: Arc<RecordingAuditSink>,
    pub validator: Arc<CountingValidator>,
}

impl TestApp {
    pub fn new() -> Self {
        let records = Arc::new(MemoryRecordStore::new());
        let audit = Arc::new(RecordingAuditSink::default());
        let validator = Arc::new(CountingValidator::new(claims_validator()));

        let state = AppState::new(
            id_codec(),
            validator.clone(),
            records.clone(),
            audit.clone(),
        );

        Self {
            state,
            records,
            audit,
            validator,
        }
    }

    pub fn with_records(mut self, records: Arc<dyn RecordStore>) -> Self {
        self.state.records = records;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.state.audit = audit;
        self
    }

    pub fn router(&self) -> Router {
        build_router(
            self.state.clone(),
            HttpLimits {
                timeout: Duration::from_secs(5),
                body_limit_bytes: 64 * 1024,
            },
        )
    }

    pub async fn stored(&self) -> Vec<DomainRecord> {
        self.records.list(i64::MAX, 0).await.unwrap()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(router: Router, req: Request<Body>) -> TestResponse {
    let res = router.oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn post_records(token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/api/v1/records");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}
