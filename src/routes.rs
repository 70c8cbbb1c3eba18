use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, HttpResponse};
use tracing::{info, warn};

use crate::auth::{AuthService, CurrentUser, TokenKeys};
use crate::content::ContentGateway;
use crate::error::ApiError;
use crate::models::*;
use crate::notion::NotionApi;
use crate::questions::QuestionGenerator;
use crate::repo::UserRepo;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Unprocessable(err.to_string()).into()
    }))
    .app_data(web::FormConfig::default().error_handler(|err, _req| {
        ApiError::Unprocessable(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::Unprocessable(err.to_string()).into()
    }))
    .service(web::resource("/").route(web::get().to(root)))
    .service(web::resource("/register").route(web::post().to(register)))
    .service(web::resource("/token").route(web::post().to(login_for_access_token)))
    .service(web::resource("/users/me").route(web::get().to(read_users_me)))
    .service(web::resource("/notion/token").route(web::post().to(save_notion_token)))
    .service(web::resource("/notion/pages").route(web::get().to(list_notion_pages)))
    .service(
        web::resource("/notion/pages/{page_id}/content")
            .route(web::get().to(get_notion_page_content)),
    )
    .service(web::resource("/generate-questions").route(web::post().to(generate_questions)));
}

/// Credentialed CORS for a fixed allow-list of serialized origins.
pub fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |c, origin| c.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub auth: AuthService,
    pub gateway: ContentGateway,
    pub questions: Arc<dyn QuestionGenerator>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepo>,
        keys: TokenKeys,
        notion: Arc<dyn NotionApi>,
        questions: Arc<dyn QuestionGenerator>,
    ) -> Self {
        Self {
            auth: AuthService::new(users.clone(), keys),
            users,
            gateway: ContentGateway::new(notion),
            questions,
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Welcome message", body = MessageResponse))
)]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: "Welcome to Notion Quiz Maker Backend!".into(),
    })
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = NewUser,
    responses(
        (status = 200, description = "User registered", body = User),
        (status = 400, description = "Username already registered")
    )
)]
pub async fn register(
    data: web::Data<AppState>,
    payload: web::Json<NewUser>,
) -> Result<HttpResponse, ApiError> {
    let user = data.auth.register(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(User::from(&user)))
}

#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Bearer token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn login_for_access_token(
    data: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, ApiError> {
    let Some(user) = data.auth.authenticate(&form.username, &form.password).await else {
        warn!(username = %form.username, "failed login");
        return Err(ApiError::Unauthorized(ApiError::BAD_LOGIN));
    };
    let access_token = data.auth.issue_token(&user.username, None)?;
    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user profile", body = User),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
pub async fn read_users_me(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(User::from(&user.0))
}

#[utoipa::path(
    post,
    path = "/notion/token",
    tag = "notion",
    request_body = NotionTokenRequest,
    responses(
        (status = 200, description = "Token stored", body = MessageResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
pub async fn save_notion_token(
    user: CurrentUser,
    data: web::Data<AppState>,
    payload: web::Json<NotionTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let NotionTokenRequest { notion_api_token } = payload.into_inner();
    data.users.set_notion_token(&user.0.username, notion_api_token).await?;
    info!(username = %user.0.username, "stored notion api token");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Notion API token saved successfully".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/notion/pages",
    tag = "notion",
    responses(
        (status = 200, description = "Pages visible to the stored token", body = PagesResponse),
        (status = 400, description = "Notion API token not set"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Notion API error")
    ),
    security(("bearer" = []))
)]
pub async fn list_notion_pages(
    user: CurrentUser,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let pages = data.gateway.list_pages(&user.0).await?;
    Ok(HttpResponse::Ok().json(PagesResponse { pages }))
}

#[utoipa::path(
    get,
    path = "/notion/pages/{page_id}/content",
    tag = "notion",
    params(("page_id" = String, Path, description = "Notion page id")),
    responses(
        (status = 200, description = "Flattened page text", body = PageContentResponse),
        (status = 400, description = "Notion API token not set"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Notion API error")
    ),
    security(("bearer" = []))
)]
pub async fn get_notion_page_content(
    user: CurrentUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let content = data.gateway.get_page_text(&user.0, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PageContentResponse { content }))
}

#[utoipa::path(
    post,
    path = "/generate-questions",
    tag = "notion",
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Generated questions", body = [GeneratedQuestion]),
        (status = 400, description = "Notion API token not set, or page has no content"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Notion API error")
    ),
    security(("bearer" = []))
)]
pub async fn generate_questions(
    user: CurrentUser,
    data: web::Data<AppState>,
    payload: web::Json<QuestionRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = payload.into_inner();
    let text = data.gateway.get_page_text(&user.0, &req.page_id).await?;
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Notion page has no content to generate questions from.".into(),
        ));
    }
    let questions = data
        .questions
        .generate(&text, req.num_questions, &req.question_type)
        .await;
    Ok(HttpResponse::Ok().json(questions))
}
