/*
 * Responsibility
 * - プロセス内だけで完結する RecordStore (STORE_BACKEND=memory)
 * - 開発・テスト用。再起動で消える
 */
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::repos::error::RepoError;
use crate::repos::record_repo::{DomainRecord, NewRecord, RecordStore};

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: Mutex<Vec<DomainRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> MutexGuard<'_, Vec<DomainRecord>> {
        // 各操作は push/read だけなので、poison されても中身は壊れていない
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, record: NewRecord) -> Result<DomainRecord, RepoError> {
        let mut rows = self.rows();
        let row = DomainRecord {
            id: rows.len() as i64 + 1,
            flag: record.flag,
            payload: record.payload,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: i64) -> Result<Option<DomainRecord>, RepoError> {
        Ok(self.rows().iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<DomainRecord>, RepoError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let offset = usize::try_from(offset).unwrap_or(0);

        Ok(self
            .rows()
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
