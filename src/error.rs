//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Duplicate {0}")]
    Duplicate(&'static str),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("No token provided")]
    NoToken,

    #[error("No refresh token provided")]
    NoRefreshToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Not the resource owner")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoToken | AppError::NoRefreshToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_)
            | AppError::Duplicate(_)
            | AppError::AuthenticationFailed
            | AppError::InvalidToken
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Duplicate(field) => format!("{} already exists, try another", capitalize(field)),
            AppError::AuthenticationFailed => "Authentication failed".to_string(),
            AppError::NoToken => "Access Denied. No Token provided".to_string(),
            AppError::NoRefreshToken => "Access Denied. No refresh token provided.".to_string(),
            AppError::InvalidToken => "Invalid Token".to_string(),
            AppError::UserNotFound => "User Not Found!".to_string(),
            AppError::Forbidden => "You are not the owner".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Database(_) | AppError::Internal(_) => "Something went wrong".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::Internal(_) | AppError::Config(_)
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 错误响应 DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if self.is_internal() {
            tracing::error!(
                code = self.code(),
                error = %self,
                request_id = %request_id,
                "Internal error"
            );
        } else {
            tracing::warn!(
                code = self.code(),
                error = %self,
                request_id = %request_id,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            success: false,
            message: self.user_message(),
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        AppError::Validation(format!("Invalid fields: {}", fields.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NoToken.code(), 401);
        assert_eq!(AppError::NoRefreshToken.code(), 401);
        assert_eq!(AppError::InvalidToken.code(), 400);
        assert_eq!(AppError::AuthenticationFailed.code(), 400);
        assert_eq!(AppError::Forbidden.code(), 403);
        assert_eq!(AppError::UserNotFound.code(), 404);
        assert_eq!(AppError::Duplicate("phone").code(), 400);
        assert_eq!(AppError::Validation("test".to_string()).code(), 400);
    }

    #[test]
    fn test_internal_errors_are_generic_400() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(error.code(), 400);
        let message = error.user_message();
        assert_eq!(message, "Something went wrong");
        assert!(!message.contains("sqlx"));

        let error = AppError::Internal("signing key rejected".to_string());
        assert_eq!(error.user_message(), "Something went wrong");
    }

    #[test]
    fn test_duplicate_message() {
        assert_eq!(
            AppError::Duplicate("phone number").user_message(),
            "Phone number already exists, try another"
        );
        assert_eq!(
            AppError::Duplicate("email").user_message(),
            "Email already exists, try another"
        );
    }
}
