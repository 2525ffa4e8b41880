//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use argon2::Params;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use careline::{
    auth::PasswordHasher,
    config::{
        AppConfig, CorsConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig,
        StoreBackend, StoreConfig,
    },
    middleware::AppState,
    repository::MemoryUserStore,
    routes,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const ACCESS_SECRET: &str = "test-access-secret-for-testing-only-32";
pub const REFRESH_SECRET: &str = "test-refresh-secret-for-testing-only-32";
pub const PASSWORD: &str = "TestPass123";

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: Secret::new("postgresql://localhost/careline_test".to_string()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            access_token_secret: Secret::new(ACCESS_SECRET.to_string()),
            refresh_token_secret: Secret::new(REFRESH_SECRET.to_string()),
            access_token_exp_secs: 300,
            refresh_token_exp_secs: 3600,
            password_min_length: 8,
            password_require_uppercase: false,
            password_require_digit: false,
            cookie_secure: false,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
        },
    }
}

/// Router plus a handle on its backing store
pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
}

/// 创建测试应用（内存存储 + 低成本哈希参数）
pub fn create_test_app() -> TestApp {
    let users = Arc::new(MemoryUserStore::new());
    let hasher = PasswordHasher::with_params(Params::new(1024, 1, 1, None).unwrap());
    let state = AppState::new(create_test_config(), users.clone(), hasher)
        .expect("Failed to build app state");

    TestApp {
        router: routes::create_router(Arc::new(state)),
        users,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn register(&self, phone: &str, username: &str, email: Option<&str>) -> Value {
        let mut body = json!({
            "phone": phone,
            "username": username,
            "password": PASSWORD,
        });
        if let Some(email) = email {
            body["email"] = json!(email);
        }

        let response = self.send(json_request("POST", "/api/v1/auth/register", &body)).await;
        assert_eq!(response.status(), 200, "registration of {phone} failed");
        body_json(response).await
    }

    pub async fn login(&self, phone: &str, password: &str) -> Response<Body> {
        self.send(json_request(
            "POST",
            "/api/v1/auth/login",
            &json!({ "phone": phone, "password": password }),
        ))
        .await
    }

    /// Registers and logs in; returns (user id, access token, refresh token)
    pub async fn signed_in_user(&self, phone: &str, username: &str) -> (String, String, String) {
        let registered = self.register(phone, username, None).await;
        let id = registered["user"]["id"].as_str().unwrap().to_string();

        let response = self.login(phone, PASSWORD).await;
        assert_eq!(response.status(), 200);
        let access = access_token_from(&response).expect("login sets Authorization");
        let refresh = refresh_cookie_from(&response).expect("login sets refresh cookie");

        (id, access, refresh)
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn access_token_from(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn refresh_cookie_from(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let first = cookie.split(';').next()?;
            let (name, value) = first.split_once('=')?;
            (name.trim() == "refreshToken" && !value.is_empty()).then(|| value.to_string())
        })
}
