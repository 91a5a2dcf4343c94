/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RepoError / AuditError / IdCodecError を統一的に変換
 *
 * Notes
 * - 401 はどの検証に失敗したかを返さない (ログにだけ出す)
 * - 500 は内部エラーの文言を返さない
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::audit::AuditError;
use crate::services::id_codec::IdCodecError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("authentication required")]
    AuthenticationMissing,
    #[error("authentication rejected")]
    AuthenticationRejected,
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
    #[error("collaborator failure: {0}")]
    CollaboratorFailure(&'static str),
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, challenge) = match self {
            AppError::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, code, message, None)
            }
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
                None,
            ),
            AppError::AuthenticationMissing => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "authentication required".into(),
                Some("Bearer"),
            ),
            AppError::AuthenticationRejected => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "invalid token".into(),
                Some(r#"Bearer error="invalid_token""#),
            ),
            AppError::InvariantViolation(_) | AppError::CollaboratorFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        let mut res = (status, Json(body)).into_response();
        if let Some(challenge) = challenge {
            res.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(challenge),
            );
        }
        res
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(_) => AppError::CollaboratorFailure("record store"),
        }
    }
}

impl From<AuditError> for AppError {
    fn from(e: AuditError) -> Self {
        match e {
            AuditError::Db(_) => AppError::CollaboratorFailure("audit sink"),
        }
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        if e.is_client_error() {
            // Client supplied a malformed public id (e.g. /records/{id})
            AppError::bad_request("INVALID_PUBLIC_ID", "invalid id")
        } else {
            // server-side config / programming errors
            AppError::CollaboratorFailure("id codec")
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn body_json(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn rejection_is_uniform_and_carries_bearer_challenge() {
        let res = AppError::AuthenticationRejected.into_response();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers()[header::WWW_AUTHENTICATE],
            r#"Bearer error="invalid_token""#
        );
        let body = body_json(res).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "invalid token");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_detail() {
        for err in [
            AppError::InvariantViolation("claims missing from request context"),
            AppError::from(RepoError::Db(sqlx::Error::PoolClosed)),
            AppError::from(AuditError::Db(sqlx::Error::PoolTimedOut)),
        ] {
            let res = err.into_response();
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

            let body = body_json(res).await;
            assert_eq!(body["error"]["message"], "internal server error");
        }
    }
}
