//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;

/// Plaintext behind the hash used when no account matched
const DUMMY_PASSWORD: &str = "careline-no-such-account";

/// Password hasher with configurable parameters
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: OnceCell<String>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (OWASP recommended)
    pub fn new() -> Self {
        // m=64MiB, t=3 iterations, p=4 lanes
        let params = Params::new(65536, 3, 4, None).expect("Invalid Argon2 params");
        Self::with_params(params)
    }

    /// Create hasher with explicit cost parameters
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: OnceCell::new(),
        }
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::debug!("Failed to parse password hash: {:?}", e);
            AppError::Internal(format!("Failed to parse password hash: {}", e))
        })?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::AuthenticationFailed)
    }

    /// Runs a full verification against a fixed hash made with this hasher's
    /// cost, so a login for an unknown account takes as long as a wrong password.
    pub fn verify_dummy(&self, password: &str) {
        match self.dummy_hash.get_or_try_init(|| self.hash(DUMMY_PASSWORD)) {
            Ok(hash) => {
                let _ = self.verify(password, hash);
            }
            Err(e) => tracing::warn!("Dummy hash unavailable: {}", e),
        }
    }

    /// Validate password against policy
    pub fn validate_password_policy(password: &str, policy: &SecurityConfig) -> Result<(), AppError> {
        if password.chars().count() < policy.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                policy.password_min_length
            )));
        }

        if policy.password_require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::Validation(
                "Password must contain at least one uppercase letter".to_string(),
            ));
        }

        if policy.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(
                "Password must contain at least one digit".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_params(Params::new(1024, 1, 1, None).unwrap())
    }

    fn policy(uppercase: bool, digit: bool) -> SecurityConfig {
        SecurityConfig {
            access_token_secret: Secret::new("a".repeat(32)),
            refresh_token_secret: Secret::new("b".repeat(32)),
            access_token_exp_secs: 900,
            refresh_token_exp_secs: 604800,
            password_min_length: 8,
            password_require_uppercase: uppercase,
            password_require_digit: digit,
            cookie_secure: false,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "TestPassword123!";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        hasher.verify(password, &hash).unwrap();
    }

    #[test]
    fn test_verify_fails_with_wrong_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("TestPassword123!").unwrap();

        assert!(matches!(
            hasher.verify("WrongPassword", &hash),
            Err(AppError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = fast_hasher();
        let password = "TestPassword123!";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // 盐值不同
        assert_ne!(hash1, hash2);

        hasher.verify(password, &hash1).unwrap();
        hasher.verify(password, &hash2).unwrap();
    }

    #[test]
    fn test_verify_with_malformed_hash() {
        let hasher = fast_hasher();
        assert!(matches!(
            hasher.verify("password", "not-a-phc-string"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_verify_dummy_reuses_one_hash() {
        let hasher = fast_hasher();
        assert!(hasher.dummy_hash.get().is_none());

        hasher.verify_dummy("whatever");
        let first = hasher.dummy_hash.get().cloned().unwrap();
        assert!(first.starts_with("$argon2id$"));

        hasher.verify_dummy("something else");
        assert_eq!(hasher.dummy_hash.get(), Some(&first));
    }

    #[test]
    fn test_password_policy_validation() {
        let lenient = policy(false, false);
        assert!(PasswordHasher::validate_password_policy("longenough", &lenient).is_ok());
        assert!(PasswordHasher::validate_password_policy("short", &lenient).is_err());

        let strict = policy(true, true);
        assert!(PasswordHasher::validate_password_policy("Test1234", &strict).is_ok());
        assert!(PasswordHasher::validate_password_policy("test1234", &strict).is_err());
        assert!(PasswordHasher::validate_password_policy("Testtest", &strict).is_err());
    }
}
