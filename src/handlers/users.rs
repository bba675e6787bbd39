use axum::{
    extract::{Path, State},
    Extension, Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::UserInfo;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
}

/// List all users (admin)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::CreatedAt)
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    let responses: Vec<UserResponse> = users
        .into_iter()
        .map(|u| UserResponse {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            role: u.role,
        })
        .collect();

    Ok(Json(responses))
}

/// Update a user. Customers may only update their own profile and may not
/// change roles; admins may update anyone.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<UserInfo>> {
    if claims.role == UserRole::Customer && claims.sub != id {
        return Err(AppError::Forbidden(
            "You can only update your own profile".to_string(),
        ));
    }

    if payload.role.is_some() && claims.role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "Only admins can change roles".to_string(),
        ));
    }

    let user = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active: user::ActiveModel = user.into();

    if let Some(name) = payload.name {
        active.name = Set(name);
    }

    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .filter(user::Column::Id.ne(id))
            .one(&state.db)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        active.email = Set(email);
    }

    if let Some(phone) = payload.phone {
        active.phone = Set(phone);
    }

    if let Some(role) = payload.role {
        active.role = Set(role);
    }

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

/// Delete a user (admin). Blocked while the user owns an active booking.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let active_booking = booking::Entity::find()
        .filter(booking::Column::CustomerId.eq(id))
        .filter(booking::Column::Status.eq(BookingStatus::Active))
        .one(&state.db)
        .await?;

    if active_booking.is_some() {
        return Err(AppError::Conflict(
            "User has active bookings and cannot be deleted".to_string(),
        ));
    }

    user::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}
