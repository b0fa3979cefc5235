pub mod auth_service;
pub use auth_service::{AuthError, AuthService, Identity, LoginResult, NewIdentity, ProfileUpdate};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod policy;
pub use policy::{Caller, OwnedEntity, PolicyError};

pub mod token;
pub use token::{Claims, TokenError, TokenKeys};
