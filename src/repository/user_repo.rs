//! User repository (PostgreSQL)

use super::{UserStore, EMAIL_FIELD, PHONE_FIELD};
use crate::{
    error::AppError,
    models::user::{NewUser, User, UserChanges, UserType},
};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, phone, email, username, user_type, password_hash, created_at";

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let user_type: String = row.try_get("user_type")?;
        let user_type = user_type
            .parse::<UserType>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "user_type".to_string(),
                source: Box::new(e),
            })?;

        Ok(User {
            id: row.try_get("id")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            user_type,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Maps unique-index violations to the field they guard
fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_email_key") => AppError::Duplicate(EMAIL_FIELD),
                _ => AppError::Duplicate(PHONE_FIELD),
            };
        }
    }
    AppError::Database(err)
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn list(&self, types: &[UserType]) -> Result<Vec<User>, AppError> {
        let users = if types.is_empty() {
            sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
            ))
            .fetch_all(&self.db)
            .await?
        } else {
            let names: Vec<&str> = types.iter().map(UserType::as_str).collect();
            sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE user_type = ANY($1) ORDER BY created_at ASC"
            ))
            .bind(&names)
            .fetch_all(&self.db)
            .await?
        };

        Ok(users)
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (phone, email, username, user_type, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.phone)
        .bind(&user.email)
        .bind(&user.username)
        .bind(user.user_type.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique_violation)
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET
                username = COALESCE($2, username),
                email = COALESCE($3, email)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.email)
        .fetch_optional(&self.db)
        .await
        .map_err(map_unique_violation)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_one(&self.db).await?;
        Ok(())
    }
}
