//! Credential store layer
//!
//! Handlers only see the [`UserStore`] trait. Phone and email uniqueness is
//! the store's job: both implementations reject a duplicate insert or update
//! with [`AppError::Duplicate`] even when two requests race past the
//! handler-level checks.

pub mod memory;
pub mod user_repo;

pub use memory::MemoryUserStore;
pub use user_repo::PgUserStore;

use crate::{
    error::AppError,
    models::user::{NewUser, User, UserChanges, UserType},
};
use async_trait::async_trait;
use uuid::Uuid;

/// Field labels used in duplicate errors
pub const PHONE_FIELD: &str = "phone number";
pub const EMAIL_FIELD: &str = "email";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// All users, oldest first. A non-empty `types` restricts the result to
    /// those user types.
    async fn list(&self, types: &[UserType]) -> Result<Vec<User>, AppError>;

    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    /// Apply `changes`; `Ok(None)` when no user has this id.
    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>, AppError>;

    /// Remove and return the user; `Ok(None)` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Readiness probe
    async fn ping(&self) -> Result<(), AppError>;
}
