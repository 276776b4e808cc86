//! Role checks for the portal
//!
//! Two roles only: employees see their own records, admins see and
//! manage everything.

use hr_core::traits::{Id, Owned};
use hr_core::HrError;
use hr_models::Role;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Id,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(id: Id, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    pub fn employee(id: Id, email: impl Into<String>) -> Self {
        Self::new(id, email, Role::Employee)
    }

    pub fn admin(id: Id, email: impl Into<String>) -> Self {
        Self::new(id, email, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_admin(&self) -> Result<(), HrError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(HrError::forbidden("Admin access required"))
        }
    }

    /// Owners and admins may read a record
    pub fn can_access<T: Owned>(&self, record: &T) -> bool {
        self.is_admin() || record.is_owned_by(self.id)
    }

    pub fn require_access<T: Owned>(&self, record: &T) -> Result<(), HrError> {
        if self.can_access(record) {
            Ok(())
        } else {
            Err(HrError::forbidden("You do not have access to this record"))
        }
    }
}
