//! JWT token generation and validation
//! Implements access token + refresh token pattern with separate signing keys

use crate::{
    config::AppConfig,
    error::AppError,
    models::user::{User, UserType},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identity embedded in an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessUser {
    pub id: Uuid,
    pub phone: String,
    /// Empty when the user never set one
    pub username: String,
    /// Empty when the user never set one
    pub email: String,
    pub user_type: UserType,
}

impl From<&User> for AccessUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            phone: user.phone.clone(),
            username: user.username.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            user_type: user.user_type,
        }
    }
}

/// JWT claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user: AccessUser,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshUser {
    pub id: Uuid,
}

/// JWT claims for refresh tokens; carries nothing but the user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub user: RefreshUser,
    pub iat: i64,
    pub exp: i64,
}

/// Why a token was not accepted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues and verifies access/refresh tokens
pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
    access_token_exp_secs: u64,
    refresh_token_exp_secs: u64,
}

impl TokenService {
    /// Create token service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let access_secret = config.security.access_token_secret.expose_secret();
        let refresh_secret = config.security.refresh_token_secret.expose_secret();

        // An empty key would sign tokens anyone can forge
        if access_secret.len() < 32 || refresh_secret.len() < 32 {
            return Err(AppError::Config("Token secrets too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            access: SigningKeys::from_secret(access_secret),
            refresh: SigningKeys::from_secret(refresh_secret),
            access_token_exp_secs: config.security.access_token_exp_secs,
            refresh_token_exp_secs: config.security.refresh_token_exp_secs,
        })
    }

    /// Generate access token
    pub fn issue_access_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            user: AccessUser::from(user),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_exp_secs as i64)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.access.encoding).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::Internal(format!("Failed to encode access token: {}", e))
        })
    }

    /// Generate refresh token
    pub fn issue_refresh_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            user: RefreshUser { id: user.id },
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.refresh_token_exp_secs as i64)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.refresh.encoding).map_err(|e| {
            tracing::error!("Failed to encode refresh token: {:?}", e);
            AppError::Internal(format!("Failed to encode refresh token: {}", e))
        })
    }

    /// Check signature and expiry of an access token
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        verify(token, &self.access.decoding)
    }

    /// Check signature and expiry of a refresh token
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        verify(token, &self.refresh.decoding)
    }
}

fn verify<T: DeserializeOwned>(token: &str, key: &DecodingKey) -> Result<T, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expired means expired: no clock-skew allowance
    validation.leeway = 0;

    decode::<T>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Token validation failed: {:?}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })
}
