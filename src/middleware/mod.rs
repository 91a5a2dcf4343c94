/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: Authorization Gate (Bearer 検証 → AuthCtx)
 * - http: request-id / trace / body limit / timeout
 */
pub mod auth;
pub mod http;
