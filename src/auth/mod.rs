//! Authentication: tokens, password hashing, session middleware

pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{AccessClaims, AccessUser, RefreshClaims, TokenError, TokenService};
pub use middleware::{extract_access_token, require_owner, require_session, SessionUser};
pub use password::PasswordHasher;
