//! Startup configuration loaded from the environment.
//!
//! The signing secret is the only required variable; everything else has a
//! development default matching the local frontend setup.

use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

const SECRET_PLACEHOLDER: &str = "YOUR_SECRET_KEY_NOT_SET";
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set. Please set it in your environment or in a .env file.")]
    MissingVar(String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub secret_key: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_ttl: chrono::Duration,
    pub cors_origins: Vec<String>,
    pub notion_api_base: String,
    pub notion_version: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.trim().is_empty() && s != SECRET_PLACEHOLDER)
            .ok_or_else(|| ConfigError::MissingVar("SECRET_KEY".into()))?;

        let bind_raw = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8000".into());
        let bind_address = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".into(), e.to_string()))?;

        let alg_raw = lookup("JWT_ALGORITHM").unwrap_or_else(|| "HS256".into());
        let jwt_algorithm = match Algorithm::from_str(&alg_raw) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "JWT_ALGORITHM".into(),
                    format!("'{alg_raw}' is not one of HS256, HS384, HS512"),
                ))
            }
        };

        let ttl_raw = lookup("ACCESS_TOKEN_EXPIRE_MINUTES").unwrap_or_else(|| "30".into());
        let ttl_minutes = ttl_raw
            .parse::<i64>()
            .ok()
            .filter(|m| (1..=MAX_TTL_MINUTES).contains(m))
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "ACCESS_TOKEN_EXPIRE_MINUTES".into(),
                    format!("'{ttl_raw}' is not a number of minutes between 1 and {MAX_TTL_MINUTES}"),
                )
            })?;

        let cors_origins = parse_origins(
            &lookup("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()),
        )?;

        let notion_api_base = lookup("NOTION_API_BASE")
            .unwrap_or_else(|| "https://api.notion.com".into())
            .trim_end_matches('/')
            .to_string();
        let notion_version = lookup("NOTION_VERSION").unwrap_or_else(|| "2022-06-28".into());

        Ok(Self {
            bind_address,
            secret_key,
            jwt_algorithm,
            access_token_ttl: chrono::Duration::minutes(ttl_minutes),
            cors_origins,
            notion_api_base,
            notion_version,
        })
    }

    /// Short secrets still work but weaken HMAC signatures.
    pub fn secret_is_weak(&self) -> bool {
        self.secret_key.len() < 32
    }
}

/// Split a comma separated allow-list into serialized origins
/// (`scheme://host[:port]`). Wildcards and anything carrying a path, query or
/// fragment are rejected.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidValue("CORS_ORIGINS".into(), msg);
    let mut origins = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let url = reqwest::Url::parse(item)
            .map_err(|e| invalid(format!("'{item}' is not an origin: {e}")))?;
        let origin = url.origin();
        if !origin.is_tuple()
            || url.path() != "/"
            || url.query().is_some()
            || url.fragment().is_some()
            || !url.username().is_empty()
        {
            return Err(invalid(format!("'{item}' is not an origin")));
        }
        origins.push(origin.ascii_serialization());
    }
    if origins.is_empty() {
        return Err(invalid("no origins listed".into()));
    }
    Ok(origins)
}
