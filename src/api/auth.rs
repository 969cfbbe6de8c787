//! Authentication endpoints and admin-guard middleware

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::db::NewUser;

/// One message for unknown-user and wrong-password alike, so the endpoint
/// can't be used to enumerate accounts
const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Build auth router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .with_state(state)
}

// --- Request/Response types ---

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserInfo,
}

#[derive(Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_admin: bool,
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

impl UserInfo {
    fn from_user(user: &crate::db::User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            is_admin: user.is_admin,
        }
    }
}

// --- Handlers ---

/// Authenticate with username and password
async fn login(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = state
        .user_repo
        .authenticate(&req.username, &req.password)
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_response("db_error", &e.to_string()),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                error_response("invalid_credentials", INVALID_CREDENTIALS),
            )
        })?;

    let token = state.tokens.issue(&user.username, user.id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_response("token_error", &e.to_string()),
        )
    })?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
        user: UserInfo::from_user(&user),
    }))
}

/// Register a new account
async fn register(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), (StatusCode, Json<ErrorResponse>)> {
    let user = state
        .user_repo
        .create(&NewUser {
            username: req.username,
            password: req.password,
            email: Some(req.email),
            full_name: req.full_name,
            is_admin: false,
        })
        .map_err(|e| match e {
            crate::Error::Auth(msg) => {
                (StatusCode::BAD_REQUEST, error_response("registration_failed", &msg))
            }
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_response("db_error", &other.to_string()),
            ),
        })?;

    let token = state.tokens.issue(&user.username, user.id).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_response("token_error", &e.to_string()),
        )
    })?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            access_token: token,
            token_type: "bearer",
            user: UserInfo::from_user(&user),
        }),
    ))
}

// --- Middleware ---

/// Extract a bearer token from the Authorization header
fn extract_bearer(req: &Request) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Middleware requiring a valid token for an active admin account
pub async fn require_admin(
    State(state): State<Arc<ApiState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(token) = extract_bearer(&req) else {
        tracing::debug!("no bearer token provided");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims = state.tokens.validate(token).map_err(|e| {
        tracing::debug!(error = %e, "token validation failed");
        StatusCode::UNAUTHORIZED
    })?;

    let user = state
        .user_repo
        .find(claims.user_id)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !user.is_active || !user.is_admin {
        tracing::warn!(user_id = user.id, "non-admin access to admin endpoint denied");
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_extract_bearer() {
        let mut req = Request::builder().body(Body::empty()).unwrap();

        // No header
        assert_eq!(extract_bearer(&req), None);

        // With Bearer token
        req.headers_mut().insert(
            "authorization",
            HeaderValue::from_static("Bearer token-123"),
        );
        assert_eq!(extract_bearer(&req), Some("token-123"));
    }
}
