/*
 * Responsibility
 * - audit_log テーブルへの追記 (INSERT のみ。UPDATE / DELETE は書かない)
 * - AuditSink の Postgres 実装
 */
use async_trait::async_trait;
use sqlx::PgPool;

use crate::services::audit::{AuditError, AuditRecord, AuditSink};

#[derive(Debug, Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log ("eventId", subject, action, "occurredAt")
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.event_id)
        .bind(&record.subject)
        .bind(&record.action)
        .bind(record.occurred_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
