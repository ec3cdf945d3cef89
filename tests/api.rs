//! HTTP integration tests: bearer authentication end to end

use std::net::TcpListener;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use serde_json::Value;
use token_maker::auth::{KeyRing, Maker, TokenKind, TokenMaker};
use token_maker::startup::run;

const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";
const OTHER_SECRET: &[u8] = b"fedcba9876543210fedcba9876543210";

pub struct TestApp {
    pub address: String,
    pub key_ring: Arc<KeyRing>,
}

fn maker(kind: TokenKind, secret: &[u8]) -> TokenMaker {
    TokenMaker::new(kind, secret, Algorithm::HS256).expect("Failed to build maker")
}

fn spawn_app(kind: TokenKind) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let key_ring = Arc::new(KeyRing::new(maker(kind, SECRET)));
    let server = run(listener, Arc::clone(&key_ring)).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address, key_ring }
}

impl TestApp {
    async fn get_me(&self, token: Option<&str>) -> reqwest::Response {
        let mut request = reqwest::Client::new().get(&format!("{}/api/me", &self.address));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }
}

async fn error_code(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse response");
    body["code"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app(TokenKind::Paseto);

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rotation_in_progress"], false);
}

#[tokio::test]
async fn me_returns_identity_for_valid_token() {
    for kind in [TokenKind::Jwt, TokenKind::Paseto] {
        let app = spawn_app(kind);
        let token = app
            .key_ring
            .create_token("a@x.com", 42, Duration::seconds(60))
            .unwrap();

        let response = app.get_me(Some(&token)).await;

        assert_eq!(200, response.status().as_u16(), "{:?}", kind);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["user_id"], 42);
        assert_eq!(body["email"], "a@x.com");
    }
}

#[tokio::test]
async fn me_returns_401_without_token() {
    let app = spawn_app(TokenKind::Jwt);

    let response = app.get_me(None).await;

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "MISSING_TOKEN");
}

#[tokio::test]
async fn me_returns_401_for_non_bearer_scheme() {
    let app = spawn_app(TokenKind::Jwt);

    let response = reqwest::Client::new()
        .get(&format!("{}/api/me", &app.address))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "MISSING_TOKEN");
}

#[tokio::test]
async fn me_returns_401_for_garbage_token() {
    for kind in [TokenKind::Jwt, TokenKind::Paseto] {
        let app = spawn_app(kind);

        let response = app.get_me(Some("not-a-real-token")).await;

        assert_eq!(401, response.status().as_u16());
        assert_eq!(error_code(response).await, "TOKEN_INVALID");
    }
}

#[tokio::test]
async fn me_returns_401_for_expired_token() {
    for kind in [TokenKind::Jwt, TokenKind::Paseto] {
        let app = spawn_app(kind);
        let token = app
            .key_ring
            .create_token("a@x.com", 42, Duration::seconds(-60))
            .unwrap();

        let response = app.get_me(Some(&token)).await;

        assert_eq!(401, response.status().as_u16());
        assert_eq!(error_code(response).await, "TOKEN_EXPIRED");
    }
}

#[tokio::test]
async fn me_returns_401_for_token_signed_with_another_key() {
    for kind in [TokenKind::Jwt, TokenKind::Paseto] {
        let app = spawn_app(kind);
        let token = maker(kind, OTHER_SECRET)
            .create_token("a@x.com", 42, Duration::seconds(60))
            .unwrap();

        let response = app.get_me(Some(&token)).await;

        assert_eq!(401, response.status().as_u16());
        assert_eq!(error_code(response).await, "TOKEN_INVALID");
    }
}

#[tokio::test]
async fn rotation_accepts_old_tokens_until_retired() {
    let app = spawn_app(TokenKind::Paseto);
    let old_token = app
        .key_ring
        .create_token("a@x.com", 42, Duration::seconds(60))
        .unwrap();

    app.key_ring.rotate(maker(TokenKind::Paseto, OTHER_SECRET));
    assert_eq!(200, app.get_me(Some(&old_token)).await.status().as_u16());

    let new_token = app
        .key_ring
        .create_token("a@x.com", 42, Duration::seconds(60))
        .unwrap();
    assert_eq!(200, app.get_me(Some(&new_token)).await.status().as_u16());

    app.key_ring.retire_previous();
    let response = app.get_me(Some(&old_token)).await;
    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_INVALID");
    assert_eq!(200, app.get_me(Some(&new_token)).await.status().as_u16());
}
