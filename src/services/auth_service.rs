//! Domain service for registration, login and profile management.

use serde::Serialize;
use thiserror::Error;

use crate::entities::users::Role;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Public view of an account, without the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: i32,
    pub display_name: String,
    pub email: String,
    pub contact: Option<String>,
    pub farm_size: f32,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

/// Successful login: the identity plus a freshly issued access token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub identity: Identity,
}

/// Registration input. The secret arrives in plaintext and is hashed before
/// it ever reaches the store.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub display_name: String,
    pub email: String,
    pub secret: String,
    pub contact: Option<String>,
}

/// Partial profile update; unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub contact: Option<String>,
    pub farm_size: Option<f32>,
}

/// Domain service trait for authentication and self-service account access.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a new farmer account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] if the email is already registered.
    async fn register(&self, new: NewIdentity) -> Result<Identity, AuthError>;

    /// Verifies credentials and issues an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] for an unknown email and
    /// [`AuthError::InvalidCredentials`] when the secret does not match.
    async fn login(&self, email: &str, secret: &str) -> Result<LoginResult, AuthError>;

    /// Fetches the caller's own identity record.
    async fn profile(&self, user_id: i32) -> Result<Identity, AuthError>;

    /// Merges the provided fields onto the caller's identity record.
    async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<Identity, AuthError>;

    /// Changes the caller's password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong or
    /// the new password is invalid.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
