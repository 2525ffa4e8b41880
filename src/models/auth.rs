//! Authentication-related models

use serde::{Deserialize, Serialize};

use super::user::UserResponse;
use crate::auth::jwt::AccessUser;

/// Login request. Both fields are checked by the handler so that a missing
/// one yields a 400 rather than a deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Body returned by register
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

/// Body returned by login. Tokens travel in the header and cookie only.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

/// Payload part of a refresh response
#[derive(Debug, Serialize)]
pub struct RefreshData {
    pub user: AccessUser,
}

/// Body returned by refresh
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub data: RefreshData,
}
