//! Admin API endpoints for user management

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{auth::require_admin, ApiState};
use crate::db::{NewUser, UserUpdate};

/// Build admin router; every route requires an active admin token
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{user_id}/password", put(change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .with_state(state)
}

// --- Request/Response types ---

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl UserResponse {
    fn from_user(user: crate::db::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_admin: user.is_admin,
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
            last_login: user.last_login.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

fn error_response(code: &str, message: &str) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: ErrorDetail {
            code: code.to_string(),
            message: message.to_string(),
        },
    })
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn db_error(e: &crate::Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_response("db_error", &e.to_string()),
    )
}

// --- Handlers ---

/// List all users
async fn list_users(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.user_repo.list_all().map_err(|e| db_error(&e))?;

    Ok(Json(users.into_iter().map(UserResponse::from_user).collect()))
}

/// Create a new user
async fn create_user(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_repo
        .create(&NewUser {
            username: req.username,
            password: req.password,
            email: req.email,
            full_name: req.full_name,
            is_admin: req.is_admin,
        })
        .map_err(|e| match e {
            crate::Error::Auth(msg) => {
                (StatusCode::BAD_REQUEST, error_response("conflict", &msg))
            }
            other => db_error(&other),
        })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(user))))
}

/// Get a specific user
async fn get_user(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_repo
        .find(user_id)
        .map_err(|e| db_error(&e))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, error_response("not_found", "user not found")))?;

    Ok(Json(UserResponse::from_user(user)))
}

/// Update a user's profile fields
async fn update_user(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    state
        .user_repo
        .find(user_id)
        .map_err(|e| db_error(&e))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, error_response("not_found", "user not found")))?;

    state
        .user_repo
        .update(
            user_id,
            &UserUpdate {
                email: req.email,
                full_name: req.full_name,
                is_admin: req.is_admin,
                is_active: req.is_active,
            },
        )
        .map_err(|e| db_error(&e))?;

    let user = state
        .user_repo
        .find(user_id)
        .map_err(|e| db_error(&e))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, error_response("not_found", "user not found")))?;

    Ok(Json(UserResponse::from_user(user)))
}

/// Replace a user's password
async fn change_password(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<i64>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .user_repo
        .find(user_id)
        .map_err(|e| db_error(&e))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, error_response("not_found", "user not found")))?;

    state
        .user_repo
        .set_password(user_id, &req.password)
        .map_err(|e| db_error(&e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a user
async fn delete_user(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .user_repo
        .find(user_id)
        .map_err(|e| db_error(&e))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, error_response("not_found", "user not found")))?;

    state.user_repo.delete(user_id).map_err(|e| db_error(&e))?;

    Ok(StatusCode::NO_CONTENT)
}
