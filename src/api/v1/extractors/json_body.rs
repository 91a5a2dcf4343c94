/*
 * Responsibility
 * - 任意の JSON body を受ける (body 無しは None)
 * - 壊れた JSON / content-type 違いは axum の plain text ではなく
 *   AppError (400 INVALID_PAYLOAD) の JSON 形式で返す
 */
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub struct JsonBody<T>(pub Option<T>);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Option::<Json<T>>::from_request(req, state).await {
            Ok(body) => Ok(JsonBody(body.map(|Json(value)| value))),
            Err(rejection) => {
                tracing::debug!(
                    status = %rejection.status(),
                    reason = %rejection.body_text(),
                    "json body rejected"
                );
                Err(AppError::bad_request(
                    "INVALID_PAYLOAD",
                    rejection.body_text(),
                ))
            }
        }
    }
}
