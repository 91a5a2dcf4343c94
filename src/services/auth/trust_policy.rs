//! Trust policy: the fixed acceptance criteria for bearer tokens.
//!
//! Built once from `Config` at start-up and shared read-only (`Arc`) by every
//! request. Nothing in here is ever derived from request input.

use std::collections::BTreeSet;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::config::is_hmac;

#[derive(Debug, Error)]
pub enum TrustPolicyError {
    #[error("issuer must not be empty")]
    EmptyIssuer,
    #[error("audience set must not be empty")]
    EmptyAudience,
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("key material does not match algorithm {0:?}")]
    KeyMismatch(Algorithm),
    #[error("invalid public key pem: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),
}

/// Raw key material as supplied by configuration.
pub enum KeyMaterial<'a> {
    Secret(&'a [u8]),
    PublicKeyPem(&'a str),
}

/// Key material is intentionally not printable via Debug.
pub struct TrustPolicy {
    algorithm: Algorithm,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: BTreeSet<String>,
    leeway_seconds: u64,
}

impl std::fmt::Debug for TrustPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TrustPolicy")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TrustPolicy {
    pub fn new<I, A>(
        algorithm: Algorithm,
        key: KeyMaterial<'_>,
        issuer: impl Into<String>,
        audience: I,
        leeway_seconds: u64,
    ) -> Result<Self, TrustPolicyError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(TrustPolicyError::EmptyIssuer);
        }

        let audience: BTreeSet<String> = audience
            .into_iter()
            .map(Into::<String>::into)
            .filter(|a| !a.trim().is_empty())
            .collect();
        if audience.is_empty() {
            return Err(TrustPolicyError::EmptyAudience);
        }

        let decoding_key = match key {
            KeyMaterial::Secret(secret) if is_hmac(algorithm) => {
                if secret.is_empty() {
                    return Err(TrustPolicyError::EmptySecret);
                }
                DecodingKey::from_secret(secret)
            }
            KeyMaterial::PublicKeyPem(pem) => match algorithm {
                Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem.as_bytes())?,
                Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem.as_bytes())?,
                Algorithm::EdDSA => DecodingKey::from_ed_pem(pem.as_bytes())?,
                _ => return Err(TrustPolicyError::KeyMismatch(algorithm)),
            },
            KeyMaterial::Secret(_) => return Err(TrustPolicyError::KeyMismatch(algorithm)),
        };

        // jsonwebtoken only verifies the signature here; it accepts exactly the
        // policy algorithm, so the token header cannot pick a different one.
        // iss/aud/exp/nbf are checked by ClaimsValidator against an explicit `now`.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            algorithm,
            decoding_key,
            validation,
            issuer,
            audience,
            leeway_seconds,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &BTreeSet<String> {
        &self.audience
    }

    pub fn leeway_seconds(&self) -> u64 {
        self.leeway_seconds
    }

    pub(super) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    pub(super) fn validation(&self) -> &Validation {
        &self.validation
    }
}
