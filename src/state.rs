/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - validator: TrustPolicy を抱えた ClaimsValidator (read-only)
 *   - records / audit: 外部コラボレータ。グローバルではなくここから注入する
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::RecordStore;
use crate::services::{audit::AuditSink, auth::TokenValidator, id_codec::IdCodec};

#[derive(Clone)]
pub struct AppState {
    pub id_codec: IdCodec,
    pub validator: Arc<dyn TokenValidator>,
    pub records: Arc<dyn RecordStore>,
    pub audit: Arc<dyn AuditSink>,
}

impl AppState {
    pub fn new(
        id_codec: IdCodec,
        validator: Arc<dyn TokenValidator>,
        records: Arc<dyn RecordStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            id_codec,
            validator,
            records,
            audit,
        }
    }
}
