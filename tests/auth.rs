use actix_web::{dev::Payload, http::StatusCode, test, web, FromRequest};
use chrono::Duration;
use jsonwebtoken::Algorithm;
use notion_quiz::{
    auth::{AuthError, AuthService, CurrentUser, TokenKeys},
    models::NewUser,
    notion::{Block, NotionApi, NotionError, SearchResult},
    questions::StubQuestionGenerator,
    repo::{inmem::InMemUserRepo, UserRepo},
    AppState,
};
use std::sync::Arc;

const SECRET: &[u8] = b"test-secret-must-be-32-bytes-long!!";

struct NoNotion;

#[async_trait::async_trait]
impl NotionApi for NoNotion {
    async fn search_pages(&self, _token: &str) -> Result<Vec<SearchResult>, NotionError> { Ok(vec![]) }
    async fn block_children(&self, _token: &str, _id: &str) -> Result<Vec<Block>, NotionError> { Ok(vec![]) }
}

fn keys() -> TokenKeys {
    TokenKeys::new(SECRET, Algorithm::HS256, Duration::minutes(30))
}

fn service() -> (AuthService, Arc<InMemUserRepo>) {
    let repo = Arc::new(InMemUserRepo::new());
    (AuthService::new(repo.clone(), keys()), repo)
}

fn new_user(name: &str, password: &str) -> NewUser {
    NewUser {
        username: name.into(),
        password: password.into(),
        email: Some(format!("{name}@example.com")),
        full_name: None,
    }
}

#[tokio::test]
async fn duplicate_registration_conflicts_and_keeps_first_hash() {
    let (auth, repo) = service();
    let first = auth.register(new_user("alice", "pw-one")).await.expect("register");
    assert_eq!(first.disabled, Some(false));
    assert!(first.notion_api_token.is_none());

    let err = auth.register(new_user("alice", "pw-two")).await.unwrap_err();
    assert!(matches!(err, AuthError::Conflict));

    let stored = repo.get_user("alice").await.unwrap();
    assert_eq!(stored.password_hash, first.password_hash);
    assert!(auth.authenticate("alice", "pw-one").await.is_some());
    assert!(auth.authenticate("alice", "pw-two").await.is_none());
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let (auth, _) = service();
    auth.register(new_user("bob", "hunter2")).await.unwrap();
    assert!(auth.authenticate("bob", "wrong").await.is_none());
    assert!(auth.authenticate("nobody", "hunter2").await.is_none());
    let ok = auth.authenticate("bob", "hunter2").await.expect("valid login");
    assert_eq!(ok.username, "bob");
}

#[tokio::test]
async fn token_verifies_to_its_subject() {
    let (auth, _) = service();
    auth.register(new_user("carol", "pw")).await.unwrap();
    let token = auth.issue_token("carol", None).unwrap();
    let user = auth.verify_token(&token).await.expect("valid token");
    assert_eq!(user.username, "carol");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (auth, _) = service();
    auth.register(new_user("dave", "pw")).await.unwrap();
    let token = auth.issue_token("dave", Some(Duration::seconds(-10))).unwrap();
    assert!(matches!(auth.verify_token(&token).await, Err(AuthError::InvalidToken)));
}

#[tokio::test]
async fn foreign_signature_or_algorithm_is_rejected() {
    let (auth, _) = service();
    auth.register(new_user("erin", "pw")).await.unwrap();

    let other_secret = TokenKeys::new(b"another-secret-of-sufficient-length", Algorithm::HS256, Duration::minutes(5));
    let forged = other_secret.encode("erin", Duration::minutes(5)).unwrap();
    assert!(auth.verify_token(&forged).await.is_err());

    let other_alg = TokenKeys::new(SECRET, Algorithm::HS512, Duration::minutes(5));
    let mismatched = other_alg.encode("erin", Duration::minutes(5)).unwrap();
    assert!(auth.verify_token(&mismatched).await.is_err());

    assert!(auth.verify_token("not.a.jwt").await.is_err());
}

#[tokio::test]
async fn token_for_unregistered_subject_is_rejected() {
    let (auth, _) = service();
    let token = auth.issue_token("ghost", None).unwrap();
    assert!(matches!(auth.verify_token(&token).await, Err(AuthError::InvalidToken)));
}

fn state() -> AppState {
    AppState::new(
        Arc::new(InMemUserRepo::new()),
        keys(),
        Arc::new(NoNotion),
        Arc::new(StubQuestionGenerator),
    )
}

#[actix_web::test]
async fn extractor_resolves_current_user() {
    let state = state();
    state.auth.register(new_user("frank", "pw")).await.unwrap();
    let token = state.auth.issue_token("frank", None).unwrap();
    let req = test::TestRequest::default()
        .app_data(web::Data::new(state))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_http_request();
    let mut pl = Payload::None;
    let user = CurrentUser::from_request(&req, &mut pl).await.expect("extract");
    assert_eq!(user.0.username, "frank");
}

#[actix_web::test]
async fn extractor_rejects_missing_and_invalid_tokens() {
    let data = web::Data::new(state());
    for header in [None, Some("Bearer notatoken"), Some("Basic Zm9vOmJhcg==")] {
        let mut req = test::TestRequest::default().app_data(data.clone());
        if let Some(h) = header {
            req = req.insert_header(("Authorization", h));
        }
        let req = req.to_http_request();
        let mut pl = Payload::None;
        let err = CurrentUser::from_request(&req, &mut pl).await.err().expect("rejected");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get("www-authenticate").unwrap(), "Bearer");
    }
}
