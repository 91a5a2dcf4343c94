use async_trait::async_trait;

use crate::services::audit::sink::{AuditError, AuditRecord, AuditSink};

/// Writes each audit record as a structured `tracing` event on the `audit` target.
///
/// Used with the memory store backend. Durability is whatever the log
/// pipeline gives (stdout by default).
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    fn backend_name(&self) -> &'static str {
        "tracing"
    }

    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            event_id = %record.event_id,
            subject = %record.subject,
            action = %record.action,
            occurred_at = %record.occurred_at.to_rfc3339(),
            "audit"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn append_always_succeeds() {
        let sink = TracingAuditSink;
        let record = AuditRecord::new("alice", "created an important information", Utc::now());

        assert!(sink.append(&record).await.is_ok());
        assert_eq!(sink.backend_name(), "tracing");
    }
}
