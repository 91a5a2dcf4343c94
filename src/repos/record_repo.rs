/*
 * Responsibility
 * - records テーブル向け SQLx 操作 (create / get / list)
 * - RecordStore trait で handler から backend を隠す (PgPool を直接触らせない)
 * - DB エラーは RepoError で返す
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DomainRecord {
    #[sqlx(rename = "recordId")]
    pub id: i64,

    pub flag: bool,
    pub payload: String,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the handler; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub flag: bool,
    pub payload: String,
}

/// Persistence store contract.
///
/// Each call is atomic on its own; callers do not add locking on top.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn create(&self, record: NewRecord) -> Result<DomainRecord, RepoError>;

    async fn get(&self, id: i64) -> Result<Option<DomainRecord>, RepoError>;

    // Newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<DomainRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, record: NewRecord) -> Result<DomainRecord, RepoError> {
        let row = sqlx::query_as::<_, DomainRecord>(
            r#"
            INSERT INTO records (flag, payload)
            VALUES ($1, $2)
            RETURNING "recordId", flag, payload, "createdAt"
            "#,
        )
        .bind(record.flag)
        .bind(&record.payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get(&self, id: i64) -> Result<Option<DomainRecord>, RepoError> {
        let row = sqlx::query_as::<_, DomainRecord>(
            r#"
            SELECT "recordId", flag, payload, "createdAt"
            FROM records
            WHERE "recordId" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<DomainRecord>, RepoError> {
        let rows = sqlx::query_as::<_, DomainRecord>(
            r#"
            SELECT "recordId", flag, payload, "createdAt"
            FROM records
            ORDER BY "recordId" DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
