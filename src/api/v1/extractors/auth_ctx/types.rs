/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - extensions は型で引くので、ヘッダやクエリ等の request 由来の値と衝突しない
 * - コンストラクタは crate 内限定。検証に成功した ClaimSet からしか作れない
 */
use crate::services::auth::ClaimSet;

/// 認証済みのリクエストに付与されるコンテキスト
#[derive(Debug, Clone)]
pub struct AuthCtx {
    claims: ClaimSet,
}

impl AuthCtx {
    pub(crate) fn new(claims: ClaimSet) -> Self {
        Self { claims }
    }

    /// Principal identity (`sub`).
    pub fn subject(&self) -> &str {
        &self.claims.subject
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }
}
