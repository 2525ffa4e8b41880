//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

use crate::{
    auth::{require_owner, require_session},
    config::CorsConfig,
    handlers,
    middleware::AppState,
};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需会话）
    let auth_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/guestlink", get(handlers::auth::guestlink));

    // 仅资源所有者可修改
    let owner_routes = Router::new()
        .route(
            "/users/{id}",
            patch(handlers::user::update_user).delete(handlers::user::delete_user),
        )
        .route_layer(axum::middleware::from_fn(require_owner));

    // 需要会话的路由
    let session_routes = Router::new()
        .route("/auth/authlink", get(handlers::auth::authlink))
        .route("/users", get(handlers::user::list_users))
        .merge(owner_routes)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let api = Router::new().merge(auth_routes).merge(session_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api)
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config.cors))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// Credentialed CORS for the configured origins. `Authorization` is exposed
/// so browsers can read renewed access tokens.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::AUTHORIZATION])
        .allow_credentials(true)
}
