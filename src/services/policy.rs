//! Ownership and role policy, defined once and reused by every resource.
//!
//! A [`Caller`] is the verified identity attached to a request by the access
//! gate. Resources scoped to an owner implement [`OwnedEntity`] so that list
//! queries and single-record guards share the same rules: admins see
//! everything, everyone else sees only rows they own.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};
use thiserror::Error;

use crate::entities::users::Role;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Access denied")]
    Forbidden,
}

/// An entity tied to exactly one owning identity.
pub trait OwnedEntity: EntityTrait {
    fn owner_column() -> Self::Column;
}

impl OwnedEntity for crate::entities::crops::Entity {
    fn owner_column() -> Self::Column {
        crate::entities::crops::Column::OwnerId
    }
}

/// Verified identity and role for the current request.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: i32,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub const fn new(id: i32, role: Role) -> Self {
        Self { id, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Guards access to a single owned record.
    pub fn assert_owner(&self, owner_id: i32) -> Result<(), PolicyError> {
        if self.is_admin() || owner_id == self.id {
            Ok(())
        } else {
            Err(PolicyError::Forbidden)
        }
    }

    /// Narrows a select over an owned entity to rows this caller may see.
    /// Admin queries pass through unscoped.
    #[must_use]
    pub fn scope<E: OwnedEntity>(&self, select: Select<E>) -> Select<E> {
        if self.is_admin() {
            select
        } else {
            select.filter(E::owner_column().eq(self.id))
        }
    }
}
