//! Shared harness for the HTTP tests: the full router over in-memory
//! repositories, a cheap Argon2 configuration and a known signing secret.

use std::sync::Arc;

use api_adapters::AppState;
use auth_adapters::{Argon2Hasher, JwtTokenService};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use domains::{HashedPassword, PasswordHasher, Role, TokenService, User, UserRepository};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use services::{AuthService, PaginationPolicy, PostService};
use storage_adapters::{InMemoryPostRepo, InMemoryUserRepo};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepo>,
    pub hasher: Arc<Argon2Hasher>,
    pub tokens: Arc<JwtTokenService>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn spawn_app() -> TestApp {
    let users = Arc::new(InMemoryUserRepo::new());
    let posts = Arc::new(InMemoryPostRepo::new());
    let hasher = Arc::new(Argon2Hasher::new(8, 1, 1).expect("valid argon2 params"));
    let tokens = Arc::new(secret_service());

    let state = AppState {
        auth: Arc::new(AuthService::new(users.clone(), hasher.clone(), tokens.clone())),
        posts: Arc::new(PostService::new(posts, PaginationPolicy::default())),
        tokens: tokens.clone(),
    };

    TestApp {
        router: api_adapters::router(state),
        users,
        hasher,
        tokens,
    }
}

/// A token service sharing the app's secret, for minting odd tokens.
pub fn secret_service() -> JwtTokenService {
    JwtTokenService::new(&SecretString::from(TEST_SECRET.to_string()))
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("readable body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }

    /// Creates a user directly in the store with the given role, the way the
    /// seed tool does.
    pub async fn seed_user(&self, username: &str, password: &str, role: Role) -> User {
        let hash = self.hasher.hash(password).await.expect("hash");
        self.users
            .insert(User::new(username, hash).with_role(role))
            .await
            .expect("fresh username")
    }

    /// A token for a user that need not exist in the store.
    pub fn token_for(&self, role: Role) -> String {
        let user = User::new(format!("{role}-tester"), HashedPassword::from_phc("unused"))
            .with_role(role);
        self.tokens.issue(&user).expect("signable claims")
    }

    pub async fn create_post(&self, title: &str) -> Value {
        let token = self.token_for(Role::Write);
        let response = self
            .send(
                Method::POST,
                "/api/posts",
                Some(&token),
                Some(serde_json::json!({
                    "title": title,
                    "content": "Test content",
                    "author": "Test Author",
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body
    }
}
