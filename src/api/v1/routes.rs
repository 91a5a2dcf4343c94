/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - v1 配下はすべて authorization gate の内側 (読み取りも含む)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::records::{create_record, get_record, list_records};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/records", get(list_records).post(create_record))
        .route("/records/{record_id}", get(get_record));

    middleware::auth::access::apply(router, state)
}
