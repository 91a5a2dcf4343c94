/*
 * Responsibility
 * - Records の request/response DTO
 * - 公開 ID は encode 済みの値を返す (内部 ID を漏らさない)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body を省略した場合の payload
pub const DEFAULT_PAYLOAD: &str = "important information";

const MAX_PAYLOAD_CHARS: usize = 1024;

#[derive(Debug, Default, Deserialize)]
pub struct CreateRecordRequest {
    pub payload: Option<String>,
}

impl CreateRecordRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(payload) = &self.payload {
            let trimmed = payload.trim();
            if trimmed.is_empty() {
                return Err("payload cannot be empty");
            }
            if trimmed.chars().count() > MAX_PAYLOAD_CHARS {
                return Err("payload must be <= 1024 chars");
            }
        }

        Ok(())
    }

    pub fn into_payload(self) -> String {
        self.payload
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|| DEFAULT_PAYLOAD.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: String, // encoded
    pub flag: bool,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}
