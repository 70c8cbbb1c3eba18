use crate::models::{
    GeneratedQuestion, LoginForm, MessageResponse, NewUser, NotionTokenRequest,
    PageContentResponse, PageSummary, PagesResponse, QuestionRequest, TokenResponse, User,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::root,
        crate::routes::register,
        crate::routes::login_for_access_token,
        crate::routes::read_users_me,
        crate::routes::save_notion_token,
        crate::routes::list_notion_pages,
        crate::routes::get_notion_page_content,
        crate::routes::generate_questions,
    ),
    components(schemas(
        User, NewUser, LoginForm, TokenResponse, NotionTokenRequest, MessageResponse,
        PageSummary, PagesResponse, PageContentResponse, QuestionRequest, GeneratedQuestion
    )),
    modifiers(&BearerScheme),
    tags(
        (name = "auth", description = "Registration and bearer tokens"),
        (name = "notion", description = "Notion pages and content"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by protected paths.
struct BearerScheme;

impl Modify for BearerScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
