use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use notion_quiz::auth::TokenKeys;
use notion_quiz::config::Config;
use notion_quiz::notion::NotionHttpClient;
use notion_quiz::openapi::ApiDoc;
use notion_quiz::questions::StubQuestionGenerator;
use notion_quiz::repo::inmem::InMemUserRepo;
use notion_quiz::{config, cors, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A .env file is optional; real environment variables take precedence.
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    // Refuse to start without a signing secret.
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    if cfg.secret_is_weak() {
        warn!("SECRET_KEY is shorter than 32 bytes; use a longer secret outside development");
    }

    info!("Bootstrapping Notion quiz backend");
    info!("Token lifetime: {} minutes ({:?})", cfg.access_token_ttl.num_minutes(), cfg.jwt_algorithm);
    info!("Notion API base: {} (version {})", cfg.notion_api_base, cfg.notion_version);
    info!("CORS origins: {:?}", cfg.cors_origins);
    info!("Using in-memory credential store (not persisted)");

    let state = AppState::new(
        Arc::new(InMemUserRepo::new()),
        TokenKeys::from_config(&cfg),
        Arc::new(NotionHttpClient::from_config(&cfg)),
        Arc::new(StubQuestionGenerator),
    );
    let openapi = ApiDoc::openapi();
    let origins = cfg.cors_origins.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors(&origins))
            .app_data(web::Data::new(state.clone()))
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
    })
    .bind(cfg.bind_address)?;

    info!("Listening on http://{}", cfg.bind_address);

    server.run().await
}
