//! Session middleware: resolves the caller from the access token, falling
//! back to the refresh cookie, plus the owner check for per-user routes.

use crate::{
    auth::{
        cookie::{refresh_cookie, refresh_token_from},
        jwt::AccessUser,
    },
    error::AppError,
    middleware::AppState,
};
use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Identity of the authenticated caller, stored in request extensions
pub type SessionUser = AccessUser;

/// Handlers take `session: SessionUser` to read the resolved identity.
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or(AppError::NoToken)
    }
}

/// Access token from the `Authorization` header, bare or with a `Bearer ` prefix
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Session middleware for protected routes.
///
/// A valid access token wins. Otherwise a valid refresh cookie mints a new
/// access token, returned in the `Authorization` response header, and the
/// refresh cookie is set again.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access_token = extract_access_token(req.headers());
    let refresh_token = refresh_token_from(&jar);

    if access_token.is_none() && refresh_token.is_none() {
        return Err(AppError::NoToken);
    }

    if let Some(token) = access_token.as_deref() {
        match state.tokens.verify_access(token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims.user);
                return Ok(next.run(req).await);
            }
            Err(reason) => {
                tracing::debug!(%reason, "Access token rejected, trying refresh token");
            }
        }
    }

    let Some(refresh_token) = refresh_token else {
        return Err(AppError::NoRefreshToken);
    };

    let session = state.auth_service.refresh(Some(&refresh_token)).await?;
    tracing::debug!(user_id = %session.user.id, "Access token renewed from refresh token");

    req.extensions_mut().insert(SessionUser::from(&session.user));
    let response = next.run(req).await;

    let jar = jar.add(refresh_cookie(
        refresh_token,
        state.config.security.cookie_secure,
    ));

    Ok((
        jar,
        [(header::AUTHORIZATION, session.access_token)],
        response,
    )
        .into_response())
}

/// Owner check: the `{id}` path segment must be the caller's own id.
///
/// Must sit inside [`require_session`].
pub async fn require_owner(
    Path(id): Path<String>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(session) = req.extensions().get::<SessionUser>() else {
        tracing::error!("Owner check ran without a resolved session");
        return Err(AppError::Internal("owner check without session".to_string()));
    };

    if session.id.to_string() != id {
        tracing::warn!(caller = %session.id, target = %id, "Owner check failed");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_access_token_bare_and_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("raw_token_123"));
        assert_eq!(extract_access_token(&headers), Some("raw_token_123".to_string()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer test_token_123"));
        assert_eq!(extract_access_token(&headers), Some("test_token_123".to_string()));
    }

    #[test]
    fn test_extract_access_token_missing_or_blank() {
        let headers = HeaderMap::new();
        assert!(extract_access_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_access_token(&headers).is_none());
    }
}
