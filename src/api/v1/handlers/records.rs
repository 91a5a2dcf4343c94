/*
 * Responsibility
 * - /records 系 handler
 * - POST: record を作成し、同じ principal (sub) 名義で audit を 1 件追記する
 * - GET: 読み取りのみ (audit しない)
 * - AuthCtx は gate が載せたものだけを使う。無ければ匿名で続行しない
 *
 * 失敗時の方針
 * - store 失敗 → audit は試みずに 500
 * - audit 失敗 → 500。record は残るので record_id を error ログに出す
 *   (rollback しない。残った record は GET でもそのまま見える。
 *    audit_log と突き合わせて reconcile するのは運用側)
 * - リトライはしない
 */
use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    api::v1::{
        dto::records::{CreateRecordRequest, RecordResponse},
        extractors::{AuthCtxExtractor, JsonBody, public_id::PublicRecordId},
    },
    error::AppError,
    repos::{DomainRecord, NewRecord},
    services::audit::AuditRecord,
    state::AppState,
};

pub const CREATE_ACTION: &str = "created an important information";

const LIST_LIMIT: i64 = 50;

fn row_to_response(state: &AppState, row: DomainRecord) -> Result<RecordResponse, AppError> {
    let public_id = state.id_codec.encode(row.id).map_err(|e| {
        tracing::error!(error = %e, record_id = row.id, "failed to encode record id");
        AppError::from(e)
    })?;

    Ok(RecordResponse {
        id: public_id,
        flag: row.flag,
        payload: row.payload,
        created_at: row.created_at,
    })
}

pub async fn create_record(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    JsonBody(body): JsonBody<CreateRecordRequest>,
) -> Result<Json<RecordResponse>, AppError> {
    let req = body.unwrap_or_default();
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_PAYLOAD", msg))?;

    let row = state
        .records
        .create(NewRecord {
            flag: true,
            payload: req.into_payload(),
        })
        .await
        .map_err(|e| {
            tracing::error!(
                error = ?e,
                store = state.records.backend_name(),
                subject = %ctx.subject(),
                "record create failed"
            );
            AppError::from(e)
        })?;

    let audit = AuditRecord::new(ctx.subject(), CREATE_ACTION, Utc::now());
    state.audit.append(&audit).await.map_err(|e| {
        tracing::error!(
            error = ?e,
            sink = state.audit.backend_name(),
            record_id = row.id,
            subject = %ctx.subject(),
            "audit append failed; record persisted without audit entry"
        );
        AppError::from(e)
    })?;

    tracing::info!(
        record_id = row.id,
        event_id = %audit.event_id,
        subject = %ctx.subject(),
        issuer = %ctx.claims().issuer,
        "record created"
    );

    Ok(Json(row_to_response(&state, row)?))
}

/// audit 失敗で取り残された record も除外せずに返す
pub async fn list_records(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<RecordResponse>>, AppError> {
    tracing::debug!(subject = %ctx.subject(), "list records");

    let rows = state.records.list(LIST_LIMIT, 0).await?;

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(row_to_response(&state, row)?);
    }

    Ok(Json(res))
}

pub async fn get_record(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    record_id: PublicRecordId,
) -> Result<Json<RecordResponse>, AppError> {
    tracing::debug!(subject = %ctx.subject(), record_id = record_id.id, "get record");

    let row = state
        .records
        .get(record_id.id)
        .await?
        .ok_or(AppError::not_found("record"))?;

    Ok(Json(row_to_response(&state, row)?))
}
