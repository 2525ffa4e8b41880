//! In-process user store
//!
//! Used by the test suite and by `store.backend = memory` for local runs.
//! Every mutation holds the write lock across its uniqueness check, so the
//! check-then-write is atomic.

use super::{UserStore, EMAIL_FIELD, PHONE_FIELD};
use crate::{
    error::AppError,
    models::user::{NewUser, User, UserChanges, UserType},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| Some(u.id) != except && u.email.as_deref() == Some(email))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.phone == phone)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn list(&self, types: &[UserType]) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| types.is_empty() || types.contains(&u.user_type))
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.phone == new_user.phone) {
            return Err(AppError::Duplicate(PHONE_FIELD));
        }
        if let Some(email) = new_user.email.as_deref() {
            if email_taken(&users, email, None) {
                return Err(AppError::Duplicate(EMAIL_FIELD));
            }
        }

        let user = User {
            id: Uuid::new_v4(),
            phone: new_user.phone,
            email: new_user.email,
            username: new_user.username,
            user_type: new_user.user_type,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;

        if let Some(email) = changes.email.as_deref() {
            if email_taken(&users, email, Some(id)) {
                return Err(AppError::Duplicate(EMAIL_FIELD));
            }
        }

        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = &changes.username {
            user.username = Some(username.clone());
        }
        if let Some(email) = &changes.email {
            user.email = Some(email.clone());
        }

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.write().await.remove(&id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
