/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, TrustPolicy 用の Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動時に一度だけ読む。リクエスト途中での再読み込みはしない
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where domain records and audit records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

/// Key material for the trust policy. Never printed.
#[derive(Clone)]
pub enum SigningKeyConfig {
    Secret(String),
    PublicKeyPem(String),
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub store: StoreBackend,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub auth_issuer: String,
    pub auth_audience: Vec<String>,
    pub auth_algorithm: Algorithm,
    pub auth_key: SigningKeyConfig,
    pub access_token_leeway_seconds: u64,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,
}

pub(crate) fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `lookup` は環境変数の代わり (テストでは HashMap を渡す)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let store = match lookup("STORE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" | "pg" => StoreBackend::Postgres {
                database_url: lookup("DATABASE_URL")
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(5),
            },
            "memory" => StoreBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let sqids_min_length = lookup("SQIDS_MIN_LENGTH")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let sqids_alphabet = lookup("SQIDS_ALPHABET").unwrap_or_else(|| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        let auth_issuer = lookup("AUTH_ISSUER").ok_or(ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audience = lookup("AUTH_AUDIENCE")
            .ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if auth_audience.is_empty() {
            return Err(ConfigError::Invalid("AUTH_AUDIENCE"));
        }

        let auth_algorithm = match lookup("AUTH_JWT_ALGORITHM") {
            Some(raw) => Algorithm::from_str(raw.trim())
                .map_err(|_| ConfigError::Invalid("AUTH_JWT_ALGORITHM"))?,
            None => Algorithm::HS256,
        };

        let auth_key = if is_hmac(auth_algorithm) {
            SigningKeyConfig::Secret(
                lookup("AUTH_JWT_SECRET").ok_or(ConfigError::Missing("AUTH_JWT_SECRET"))?,
            )
        } else {
            SigningKeyConfig::PublicKeyPem(
                lookup("AUTH_JWT_PUBLIC_KEY_PEM")
                    .ok_or(ConfigError::Missing("AUTH_JWT_PUBLIC_KEY_PEM"))?
                    .replace("\\n", "\n"),
            )
        };

        // clock skew は opt-in。既定では exp を過ぎた token は即拒否
        let access_token_leeway_seconds = lookup("ACCESS_TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let request_timeout_seconds = lookup("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let request_body_limit_bytes = lookup("REQUEST_BODY_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            app_env,
            store,
            sqids_min_length,
            sqids_alphabet,
            auth_issuer,
            auth_audience,
            auth_algorithm,
            auth_key,
            access_token_leeway_seconds,
            request_timeout_seconds,
            request_body_limit_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn memory_backend_with_hmac_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_ISSUER", "myissuer"),
            ("AUTH_AUDIENCE", "myaudience, other ,"),
            ("AUTH_JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.auth_algorithm, Algorithm::HS256);
        assert_eq!(config.auth_audience, vec!["myaudience", "other"]);
        assert_eq!(config.access_token_leeway_seconds, 0);
        assert!(matches!(config.auth_key, SigningKeyConfig::Secret(ref s) if s == "secret"));
        assert!(!config.app_env.is_production());
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = Config::from_lookup(lookup_from(&[
            ("AUTH_ISSUER", "myissuer"),
            ("AUTH_AUDIENCE", "myaudience"),
            ("AUTH_JWT_SECRET", "secret"),
        ]))
        .err();

        assert_eq!(err, Some(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn asymmetric_algorithm_requires_public_key() {
        let err = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_ISSUER", "myissuer"),
            ("AUTH_AUDIENCE", "myaudience"),
            ("AUTH_JWT_ALGORITHM", "EdDSA"),
            ("AUTH_JWT_SECRET", "secret"),
        ]))
        .err();

        assert_eq!(err, Some(ConfigError::Missing("AUTH_JWT_PUBLIC_KEY_PEM")));
    }

    #[test]
    fn escaped_newlines_in_public_key_pem_are_restored() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_ISSUER", "myissuer"),
            ("AUTH_AUDIENCE", "myaudience"),
            ("AUTH_JWT_ALGORITHM", "EdDSA"),
            (
                "AUTH_JWT_PUBLIC_KEY_PEM",
                "-----BEGIN PUBLIC KEY-----\\nMCowBQYDK2VwAyEAXIB8lvhVdyXvlx3EUv2hS8KEtSVG7LNmNgQFhXtF+sk=\\n-----END PUBLIC KEY-----",
            ),
        ]))
        .unwrap();

        assert_eq!(config.auth_algorithm, Algorithm::EdDSA);
        match config.auth_key {
            SigningKeyConfig::PublicKeyPem(pem) => {
                assert_eq!(
                    pem,
                    "-----BEGIN PUBLIC KEY-----\nMCowBQYDK2VwAyEAXIB8lvhVdyXvlx3EUv2hS8KEtSVG7LNmNgQFhXtF+sk=\n-----END PUBLIC KEY-----"
                );
                assert!(!pem.contains("\\n"));
            }
            SigningKeyConfig::Secret(_) => panic!("expected a public key"),
        }
    }

    #[test]
    fn blank_audience_and_unknown_algorithm_are_invalid() {
        let blank = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_ISSUER", "myissuer"),
            ("AUTH_AUDIENCE", " , "),
            ("AUTH_JWT_SECRET", "secret"),
        ]))
        .err();
        assert_eq!(blank, Some(ConfigError::Invalid("AUTH_AUDIENCE")));

        let alg = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_ISSUER", "myissuer"),
            ("AUTH_AUDIENCE", "myaudience"),
            ("AUTH_JWT_ALGORITHM", "none"),
        ]))
        .err();
        assert_eq!(alg, Some(ConfigError::Invalid("AUTH_JWT_ALGORITHM")));
    }
}
