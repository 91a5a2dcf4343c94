use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// `aud` in JWT can be either a string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum AudienceClaim {
    One(String),
    Many(Vec<String>),
}

impl AudienceClaim {
    pub(super) fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// Token payload as decoded, before any policy check.
///
/// Registered claims are optional here so that a missing claim turns into a
/// specific `ValidationError` instead of a generic decode failure.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawClaims {
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub aud: Option<AudienceClaim>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 検証済みのクレーム集合
///
/// - ClaimsValidator が成功した場合にだけ作られる
/// - リクエストごとに新しく作られ、リクエスト終了とともに捨てられる
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    pub subject: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub not_before: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,

    /// Custom (non-registered) claims, kept verbatim.
    pub extra: Map<String, Value>,
}

pub(super) fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}
