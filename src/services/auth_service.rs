//! 认证服务：注册、登录、令牌刷新

use crate::{
    auth::{jwt::TokenService, password::PasswordHasher},
    config::SecurityConfig,
    error::AppError,
    models::{
        auth::LoginRequest,
        user::{NewUser, RegisterRequest, User},
    },
    repository::{UserStore, EMAIL_FIELD, PHONE_FIELD},
};
use std::sync::Arc;
use validator::Validate;

/// Tokens produced by a successful login
#[derive(Debug)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Outcome of a refresh: the reloaded user and its new access token
#[derive(Debug)]
pub struct RefreshedSession {
    pub user: User,
    pub access_token: String,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        hasher: Arc<PasswordHasher>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            security,
        }
    }

    /// 注册新用户
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        let req = req.normalized();

        let (Some(phone), Some(username), Some(password)) =
            (req.phone.clone(), req.username.clone(), req.password.clone())
        else {
            return Err(AppError::Validation(
                "phone, username and password fields are required!".to_string(),
            ));
        };

        req.validate()?;
        PasswordHasher::validate_password_policy(&password, &self.security)?;

        // Friendly pre-checks; the store still enforces uniqueness on insert
        if self.users.find_by_phone(&phone).await?.is_some() {
            return Err(AppError::Duplicate(PHONE_FIELD));
        }
        if let Some(email) = req.email.as_deref() {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(AppError::Duplicate(EMAIL_FIELD));
            }
        }

        let password_hash = self.hasher.hash(&password)?;

        let user = self
            .users
            .insert(NewUser {
                phone,
                email: req.email,
                username: Some(username),
                user_type: req.user_type.unwrap_or_default(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, user_type = %user.user_type, "User registered");

        Ok(user)
    }

    /// 用户登录
    ///
    /// Unknown phone and wrong password produce the same error.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginTokens, AppError> {
        let phone = req.phone.filter(|p| !p.trim().is_empty());
        let password = req.password.filter(|p| !p.is_empty());
        let (Some(phone), Some(password)) = (phone, password) else {
            return Err(AppError::Validation(
                "phone and password fields are required".to_string(),
            ));
        };

        let Some(user) = self.users.find_by_phone(phone.trim()).await? else {
            self.hasher.verify_dummy(&password);
            tracing::info!("Login failed: unknown phone");
            return Err(AppError::AuthenticationFailed);
        };

        if let Err(e) = self.hasher.verify(&password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "Login failed: password mismatch");
            return Err(e);
        }

        let access_token = self.tokens.issue_access_token(&user)?;
        let refresh_token = self.tokens.issue_refresh_token(&user)?;

        tracing::info!(user_id = %user.id, "Login succeeded");

        Ok(LoginTokens {
            access_token,
            refresh_token,
        })
    }

    /// 刷新访问令牌
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<RefreshedSession, AppError> {
        let refresh_token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::NoRefreshToken)?;

        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(claims.user.id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let access_token = self.tokens.issue_access_token(&user)?;

        Ok(RefreshedSession { user, access_token })
    }
}
