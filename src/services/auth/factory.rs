/// Factory: build the claims validator from application `Config`.
use std::sync::Arc;

use crate::config::{Config, SigningKeyConfig};
use crate::services::auth::{
    ClaimsValidator,
    trust_policy::{KeyMaterial, TrustPolicy, TrustPolicyError},
};

pub fn build_claims_validator(config: &Config) -> Result<Arc<ClaimsValidator>, TrustPolicyError> {
    let key = match &config.auth_key {
        SigningKeyConfig::Secret(secret) => KeyMaterial::Secret(secret.as_bytes()),
        SigningKeyConfig::PublicKeyPem(pem) => KeyMaterial::PublicKeyPem(pem),
    };

    let policy = TrustPolicy::new(
        config.auth_algorithm,
        key,
        config.auth_issuer.clone(),
        config.auth_audience.iter().cloned(),
        config.access_token_leeway_seconds,
    )?;
    let validator = ClaimsValidator::new(Arc::new(policy));
    let policy = validator.policy();

    tracing::info!(
        algorithm = ?policy.algorithm(),
        issuer = %policy.issuer(),
        audience = ?policy.audience(),
        leeway_seconds = policy.leeway_seconds(),
        "trust policy loaded"
    );

    Ok(Arc::new(validator))
}
