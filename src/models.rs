use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored account. Never serialized to clients directly, see [`User`].
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub disabled: Option<bool>,
    pub password_hash: String,
    pub notion_api_token: Option<String>,
}

/// Public profile view of a [`UserRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct User {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub disabled: Option<bool>,
}

impl From<&UserRecord> for User {
    fn from(r: &UserRecord) -> Self {
        Self {
            username: r.username.clone(),
            email: r.email.clone(),
            full_name: r.full_name.clone(),
            disabled: r.disabled,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// OAuth2 password-grant form; other grant fields are accepted and ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NotionTokenRequest {
    pub notion_api_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PagesResponse {
    pub pages: Vec<PageSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageContentResponse {
    pub content: String,
}

fn default_num_questions() -> usize { 5 }
fn default_question_type() -> String { "multiple_choice".into() }

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuestionRequest {
    pub page_id: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
    /// e.g. "multiple_choice", "short_answer"
    #[serde(default = "default_question_type")]
    pub question_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Option<Vec<String>>,
    pub answer: Option<String>,
}
