use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

use crate::services::auth::claims::{self, ClaimSet, RawClaims};
use crate::services::auth::trust_policy::TrustPolicy;

/// Why a token was not accepted.
///
/// Only ever logged. Callers see a single uniform rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("issuer mismatch")]
    IssuerMismatch,
    #[error("audience mismatch")]
    AudienceMismatch,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("missing or empty '{0}' claim")]
    MissingClaim(&'static str),
}

impl From<jsonwebtoken::errors::Error> for ValidationError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::IssuerMismatch,
            ErrorKind::InvalidAudience => Self::AudienceMismatch,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            // InvalidToken / Base64 / Json / Utf8 and anything else structural
            _ => Self::MalformedToken,
        }
    }
}

/// Seam between the authorization gate and token verification.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, ValidationError>;
}

/// Verifies bearer tokens against a `TrustPolicy`.
///
/// `validate` is a pure function of (token, policy, now): no I/O, no clock reads.
#[derive(Debug, Clone)]
pub struct ClaimsValidator {
    policy: Arc<TrustPolicy>,
}

impl ClaimsValidator {
    pub fn new(policy: Arc<TrustPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    /// Structure + signature. The algorithm comes from the policy only.
    fn decode(&self, token: &str) -> Result<RawClaims, ValidationError> {
        if token.split('.').count() != 3 {
            return Err(ValidationError::MalformedToken);
        }

        let data = jsonwebtoken::decode::<RawClaims>(
            token,
            self.policy.decoding_key(),
            self.policy.validation(),
        )?;

        Ok(data.claims)
    }
}

impl TokenValidator for ClaimsValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, ValidationError> {
        let raw = self.decode(token)?;
        let policy = &self.policy;

        let issuer = raw
            .iss
            .filter(|iss| iss == policy.issuer())
            .ok_or(ValidationError::IssuerMismatch)?;

        let audience = raw.aud.map(|a| a.into_vec()).unwrap_or_default();
        if !audience.iter().any(|a| policy.audience().contains(a)) {
            return Err(ValidationError::AudienceMismatch);
        }

        let leeway = i64::try_from(policy.leeway_seconds()).unwrap_or(i64::MAX);
        let now_secs = now.timestamp();

        let exp = raw.exp.ok_or(ValidationError::MissingClaim("exp"))?;
        if now_secs > exp.saturating_add(leeway) {
            return Err(ValidationError::Expired);
        }
        if let Some(nbf) = raw.nbf
            && now_secs.saturating_add(leeway) < nbf
        {
            return Err(ValidationError::NotYetValid);
        }

        let subject = raw
            .sub
            .filter(|sub| !sub.trim().is_empty())
            .ok_or(ValidationError::MissingClaim("sub"))?;

        let expires_at = claims::timestamp(exp).ok_or(ValidationError::MalformedToken)?;

        Ok(ClaimSet {
            subject,
            issuer,
            audience,
            issued_at: raw.iat.and_then(claims::timestamp),
            not_before: raw.nbf.and_then(claims::timestamp),
            expires_at,
            extra: raw.extra,
        })
    }
}
