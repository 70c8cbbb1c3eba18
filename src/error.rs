use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::auth::AuthError;
use crate::content::GatewayError;
use crate::repo::RepoError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Username already registered")] Conflict,
    #[error("{0}")] Unauthorized(&'static str),
    #[error("Notion API token not set for this user")] MissingPrerequisite,
    #[error("{0}")] BadRequest(String),
    #[error("{0}")] Unprocessable(String),
    #[error("Notion API error: {0}")] Upstream(String),
    #[error("not found")] NotFound,
    #[error("internal error")] Internal,
}

impl ApiError {
    pub const NOT_AUTHENTICATED: &'static str = "Not authenticated";
    pub const BAD_LOGIN: &'static str = "Incorrect username or password";
    pub const BAD_CREDENTIALS: &'static str = "Could not validate credentials";
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => ApiError::NotFound,
            RepoError::Conflict => ApiError::Conflict,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Conflict => ApiError::Conflict,
            AuthError::InvalidToken => ApiError::Unauthorized(Self::BAD_CREDENTIALS),
            AuthError::Internal(msg) => {
                tracing::error!("auth failure: {msg}");
                ApiError::Internal
            }
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::MissingToken => ApiError::MissingPrerequisite,
            GatewayError::Upstream(err) => ApiError::Upstream(err.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Conflict | ApiError::MissingPrerequisite | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());
        if matches!(self, ApiError::Unauthorized(_)) {
            res.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        res.json(ApiErrorBody { detail: self.to_string() })
    }
}
