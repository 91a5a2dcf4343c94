//! Authorization gate: bearer token 検証 → AuthCtx を extensions に入れる
//!
//! - ヘッダが無い / Bearer でない → 401 (validator は呼ばない)
//! - 検証失敗 → 401。失敗理由は warn ログだけに出し、レスポンスは一律
//! - 成功 → AuthCtx (検証済み ClaimSet) を型キーで extensions に載せて次へ
//!
//! gate 自体は domain state も audit も書かない。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::Utc;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// `/api/v1/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

/// `Authorization: Bearer <token>` から token を取り出す。
/// scheme は大文字小文字を区別しない。空 token は「無し」扱い。
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()) else {
        tracing::debug!(uri = %req.uri(), "no bearer token presented");
        return Err(AppError::AuthenticationMissing);
    };

    let claims = match state.validator.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                error = %err,
                uri = %req.uri(),
                "access token validation failed"
            );
            return Err(AppError::AuthenticationRejected);
        }
    };

    tracing::debug!(
        subject = %claims.subject,
        issuer = %claims.issuer,
        audience = ?claims.audience,
        expires_at = %claims.expires_at,
        "request authenticated"
    );

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(claims));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn extracts_bearer_token_case_insensitively() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("BEARER  abc ")), Some("abc"));
    }

    #[test]
    fn other_schemes_and_empty_tokens_count_as_absent() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("Basic YWxpY2U6cHc=")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
    }
}
