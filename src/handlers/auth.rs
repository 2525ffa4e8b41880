//! 认证相关的 HTTP 处理器

use super::AppJson;
use crate::{
    auth::{
        cookie::{clear_refresh_cookie, refresh_cookie, refresh_token_from},
        SessionUser,
    },
    error::AppError,
    middleware::AppState,
    models::{
        auth::{LoginRequest, LoginResponse, RefreshData, RefreshResponse, RegisterResponse},
        user::{RegisterRequest, UserResponse},
    },
};
use axum::{
    extract::State,
    http::{header, HeaderName},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use std::sync::Arc;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let user = state.auth_service.register(req).await?;

    Ok(Json(RegisterResponse {
        success: true,
        message: "User registered successfully".to_string(),
        user: UserResponse::from(user),
    }))
}

/// 登录
///
/// The access token goes out in the `Authorization` header and the refresh
/// token in an HttpOnly cookie; the body carries neither.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<(CookieJar, [(HeaderName, String); 1], Json<LoginResponse>), AppError> {
    let tokens = state.auth_service.login(req).await?;

    let jar = jar.add(refresh_cookie(
        tokens.refresh_token,
        state.config.security.cookie_secure,
    ));

    Ok((
        jar,
        [(header::AUTHORIZATION, tokens.access_token)],
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
        }),
    ))
}

/// 刷新访问令牌
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<([(HeaderName, String); 1], Json<RefreshResponse>), AppError> {
    let refresh_token = refresh_token_from(&jar);
    let session = state
        .auth_service
        .refresh(refresh_token.as_deref())
        .await?;

    let body = RefreshResponse {
        success: true,
        message: "Access Token Refreshed".to_string(),
        access_token: session.access_token.clone(),
        data: RefreshData {
            user: SessionUser::from(&session.user),
        },
    };

    Ok(([(header::AUTHORIZATION, session.access_token)], Json(body)))
}

/// 登出：清除刷新令牌 cookie
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(clear_refresh_cookie()),
        Json(json!({
            "success": true,
            "message": "Logged out"
        })),
    )
}

/// Probe that requires a session
pub async fn authlink(session: SessionUser) -> impl IntoResponse {
    Json(json!({
        "Protected link": "Protected Link",
        "user": session
    }))
}

/// Open probe
pub async fn guestlink() -> impl IntoResponse {
    Json(json!({
        "Guest link": "Guest Link"
    }))
}
