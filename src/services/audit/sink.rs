//! Audit sink interface used by mutating handlers.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// "who did what", write-once.
///
/// Nothing in this crate updates or deletes an `AuditRecord` after `append`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub event_id: Uuid,
    pub subject: String,
    pub action: String,
    pub occurred_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        subject: impl Into<String>,
        action: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            subject: subject.into(),
            action: action.into(),
            occurred_at,
        }
    }
}

/// Audit-layer errors.
///
/// Note:
/// - Kept independent from `AppError`; handlers map every variant to an
///   internal error without echoing the text.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit db error")]
    Db(#[from] sqlx::Error),
}

/// Append-only audit sink.
///
/// Implementations provide their own atomicity for a single `append`.
#[async_trait]
pub trait AuditSink: Send + Sync {
    // Returns the sink backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}
