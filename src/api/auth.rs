use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, validation};
use crate::services::auth_service::{Identity, LoginResult, NewIdentity};
use crate::services::policy::Caller;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub display_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Access gate: verifies the `Authorization: Bearer <token>` header and
/// attaches the verified [`Caller`] to the request.
///
/// A missing header, malformed token, bad signature and expired token all
/// produce the same response; the identity record is not re-fetched, so the
/// token's embedded claims stand for the lifetime of the request.
pub async fn access_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(ApiError::unauthenticated)?;

    let claims = state.tokens().verify(&token)?;

    tracing::Span::current().record("user_id", claims.sub);
    request
        .extensions_mut()
        .insert(Caller::new(claims.sub, claims.role));

    Ok(next.run(request).await)
}

/// Role gate, composed after the access gate: admins pass through, everyone
/// else is rejected. A missing caller context means the access gate never
/// ran, so this fails closed as unauthenticated rather than forbidden.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<Caller>() {
        Some(caller) if caller.is_admin() => Ok(next.run(request).await),
        Some(_) => Err(ApiError::forbidden("Access denied, admin only")),
        None => Err(ApiError::unauthenticated()),
    }
}

/// Extract the bearer token from the `Authorization` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a farmer account. The role is always `farmer`; the admin account
/// is seeded by migration.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Identity>>), ApiError> {
    let display_name = validation::validate_display_name(&payload.display_name)?;
    let email = validation::validate_email(&payload.email)?;
    validation::validate_password(&payload.password)?;

    let identity = state
        .auth_service()
        .register(NewIdentity {
            display_name: display_name.to_string(),
            email: email.to_string(),
            secret: payload.password,
            contact: payload.contact,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(identity))))
}

/// POST /auth/login
/// Authenticate with email and password, returns an access token on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(payload.email.trim(), &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}
