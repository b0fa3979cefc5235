//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::entities::users::Role;
use crate::services::auth_service::{
    AuthError, AuthService, Identity, LoginResult, NewIdentity, ProfileUpdate,
};
use crate::services::token::TokenKeys;

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            email: user.email,
            contact: user.contact,
            farm_size: user.farm_size,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenKeys>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenKeys>, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, new: NewIdentity) -> Result<Identity, AuthError> {
        if self.store.get_user_by_email(&new.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = self
            .store
            .create_user(
                &new.display_name,
                &new.email,
                &new.secret,
                new.contact.as_deref(),
                Role::Farmer,
                &self.security,
            )
            .await?;

        tracing::info!("Registered farmer account: {}", user.email);
        Ok(Identity::from(user))
    }

    async fn login(&self, email: &str, secret: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let is_valid = self.store.verify_user_password(email, secret).await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(user.id, user.role)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(LoginResult {
            token,
            identity: Identity::from(user),
        })
    }

    async fn profile(&self, user_id: i32) -> Result<Identity, AuthError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(Identity::from(user))
    }

    async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<Identity, AuthError> {
        let user = self
            .store
            .update_user_profile(
                user_id,
                update.display_name.as_deref(),
                update.contact.as_deref(),
                update.farm_size,
            )
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(Identity::from(user))
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < 8 {
            return Err(AuthError::Validation(
                "New password must be at least 8 characters".to_string(),
            ));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let is_valid = self
            .store
            .verify_user_password(&user.email, current_password)
            .await?;
        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(user_id, new_password, &self.security)
            .await?;

        tracing::info!("Password changed for user {}", user_id);
        Ok(())
    }
}
