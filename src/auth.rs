use std::sync::{Arc, OnceLock};

use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{NewUser, UserRecord};
use crate::password::{hash_password, verify_password};
use crate::repo::{RepoError, UserRepo};
use crate::routes::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("username already registered")] Conflict,
    #[error("invalid or expired token")] InvalidToken,
    #[error("{0}")] Internal(String),
}

/// HMAC signing material plus the default token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], algorithm: Algorithm, default_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm,
            default_ttl,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.secret_key.as_bytes(), cfg.jwt_algorithm, cfg.access_token_ttl)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn encode(&self, subject: &str, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
    }

    /// Checks signature, algorithm and expiry (no leeway).
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

/// Hash compared against when a login names no stored account.
fn dummy_hash() -> anyhow::Result<&'static str> {
    static DUMMY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY.get() {
        return Ok(hash.as_str());
    }
    let hash = hash_password("no-such-account")?;
    Ok(DUMMY.get_or_init(|| hash).as_str())
}

/// Registration, password login and bearer-token issue/verification.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    keys: TokenKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, keys: TokenKeys) -> Self {
        Self { users, keys }
    }

    pub async fn register(&self, new: NewUser) -> Result<UserRecord, AuthError> {
        // skip hashing for taken names; create_user still enforces uniqueness
        if self.users.get_user(&new.username).await.is_some() {
            return Err(AuthError::Conflict);
        }
        let NewUser { username, password, email, full_name } = new;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hash task failed: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let record = UserRecord {
            username,
            email,
            full_name,
            disabled: Some(false),
            password_hash,
            notion_api_token: None,
        };
        let created = self.users.create_user(record).await.map_err(|e| match e {
            RepoError::Conflict => AuthError::Conflict,
            RepoError::NotFound => AuthError::Internal("store rejected new user".into()),
        })?;
        info!(username = %created.username, "registered user");
        Ok(created)
    }

    /// `None` for an unknown username and for a wrong password alike. Unknown
    /// names are verified against a throwaway hash so both paths cost one
    /// argon2 run.
    pub async fn authenticate(&self, username: &str, password: &str) -> Option<UserRecord> {
        let user = self.users.get_user(username).await;
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || -> anyhow::Result<bool> {
            match stored {
                Some(hash) => verify_password(&password, &hash),
                None => {
                    verify_password(&password, dummy_hash()?)?;
                    Ok(false)
                }
            }
        })
        .await;
        match verified {
            Ok(Ok(true)) => user,
            Ok(Ok(false)) => None,
            Ok(Err(e)) => {
                error!(username = %username, "password verification failed: {e}");
                None
            }
            Err(e) => {
                error!("password verification task failed: {e}");
                None
            }
        }
    }

    /// Sign a token for `username`; `ttl` falls back to the configured default.
    pub fn issue_token(&self, username: &str, ttl: Option<Duration>) -> Result<String, AuthError> {
        let ttl = ttl.unwrap_or(self.keys.default_ttl());
        self.keys
            .encode(username, ttl)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))
    }

    /// Resolve a bearer token to the account it was issued for.
    pub async fn verify_token(&self, token: &str) -> Result<UserRecord, AuthError> {
        let claims = self.keys.decode(token).map_err(|e| {
            debug!("rejected token: {e}");
            AuthError::InvalidToken
        })?;
        self.users
            .get_user(&claims.sub)
            .await
            .ok_or(AuthError::InvalidToken)
    }
}

/// Extractor yielding the account behind a valid `Authorization: Bearer` header.
pub struct CurrentUser(pub UserRecord);

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Error>>;

    fn from_request(req: &HttpRequest, pl: &mut Payload) -> Self::Future {
        // Delegate header parsing to BearerAuth.
        let bearer = BearerAuth::from_request(req, pl).into_inner();
        let state = req.app_data::<web::Data<AppState>>().cloned();
        Box::pin(async move {
            let state = state.ok_or(ApiError::Internal)?;
            let bearer = bearer.map_err(|_| ApiError::Unauthorized(ApiError::NOT_AUTHENTICATED))?;
            let user = state
                .auth
                .verify_token(bearer.token())
                .await
                .map_err(ApiError::from)?;
            Ok(CurrentUser(user))
        })
    }
}
