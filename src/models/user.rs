//! User domain models

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;
use validator::Validate;

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").expect("valid phone regex"));

/// Account category
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    Doctor,
    #[default]
    Patient,
    Hospital,
    Lab,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::Doctor => "doctor",
            UserType::Patient => "patient",
            UserType::Hospital => "hospital",
            UserType::Lab => "lab",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown user type: {0}")]
pub struct UnknownUserType(pub String);

impl FromStr for UserType {
    type Err = UnknownUserType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(UserType::Admin),
            "doctor" => Ok(UserType::Doctor),
            "patient" => Ok(UserType::Patient),
            "hospital" => Ok(UserType::Hospital),
            "lab" => Ok(UserType::Lab),
            other => Err(UnknownUserType(other.to_string())),
        }
    }
}

/// Stored user record.
///
/// Deliberately not `Serialize`: anything leaving the service goes through
/// [`UserResponse`], which has no password field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub user_type: UserType,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Values for a user about to be inserted; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub user_type: UserType,
    pub password_hash: String,
}

/// Field changes applied by an update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

/// Registration request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(regex(path = *PHONE_REGEX))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,
    pub password: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub user_type: Option<UserType>,
}

impl RegisterRequest {
    /// Blank strings count as absent.
    pub fn normalized(self) -> Self {
        Self {
            phone: non_blank(self.phone),
            username: non_blank(self.username),
            password: self.password.filter(|p| !p.is_empty()),
            email: non_blank(self.email),
            user_type: self.user_type,
        }
    }
}

/// Update user request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn normalized(self) -> Self {
        Self {
            username: non_blank(self.username),
            email: non_blank(self.email),
        }
    }
}

/// Query string for listing users, e.g. `?userType=doctor,lab`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub user_type: Option<String>,
}

impl ListUsersQuery {
    pub fn user_types(&self) -> Result<Vec<UserType>, UnknownUserType> {
        match &self.user_type {
            None => Ok(Vec::new()),
            Some(raw) => raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(UserType::from_str)
                .collect(),
        }
    }
}

/// User response (without sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub phone: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            phone: user.phone,
            email: user.email,
            username: user.username,
            user_type: user.user_type,
            created_at: user.created_at,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
