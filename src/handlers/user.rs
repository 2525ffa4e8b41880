//! 用户管理的 HTTP 处理器

use super::{AppJson, AppQuery};
use crate::{
    error::AppError,
    middleware::AppState,
    models::user::{ListUsersQuery, UpdateUserRequest, UserChanges, UserResponse},
    repository::EMAIL_FIELD,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let types = query
        .user_types()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let users: Vec<UserResponse> = state
        .users
        .list(&types)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(json!({
        "success": true,
        "message": "All users",
        "count": users.len(),
        "users": users
    })))
}

/// 更新用户
///
/// Username is applied whenever given; email only when no other user has it.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let req = req.normalized();
    req.validate()?;

    let Some(user) = state.users.find_by_id(id).await? else {
        tracing::info!(user_id = %id, "Update rejected: unknown user");
        return Err(AppError::Validation("Invalid user".to_string()));
    };

    if let Some(email) = req.email.as_deref() {
        if let Some(holder) = state.users.find_by_email(email).await? {
            if holder.id != user.id {
                return Err(AppError::Duplicate(EMAIL_FIELD));
            }
        }
    }

    let changes = UserChanges {
        username: req.username,
        email: req.email,
    };

    let user = if changes.is_empty() {
        user
    } else {
        state
            .users
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid user".to_string()))?
    };

    Ok(Json(json!({
        "success": true,
        "message": "User updated successfully!",
        "data": { "user": UserResponse::from(user) }
    })))
}

/// 删除用户
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.users.delete(id).await?.map(UserResponse::from);

    if let Some(user) = &deleted {
        tracing::info!(user_id = %user.id, "User deleted");
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "success": true,
            "message": "User Deleted Successfully",
            "data": { "deletedUser": deleted }
        })),
    ))
}
