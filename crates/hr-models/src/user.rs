//! User model
//!
//! Table: users

use chrono::{DateTime, Utc};
use hr_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// Portal role, used to gate routes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Employee,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    /// Company employee number, unique
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    /// Login email, unique
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
    pub profile_picture_url: Option<String>,
    pub two_factor_enabled: bool,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl Identifiable for User {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for User {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Data for creating a user. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
    pub password_hash: String,
}

/// Partial update for a user; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub profile_picture_url: Option<String>,
    pub two_factor_enabled: Option<bool>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

/// Fields a user may change on their own profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub profile_picture_url: Option<String>,
    pub two_factor_enabled: Option<bool>,
}

impl From<ProfileUpdate> for UserUpdate {
    fn from(p: ProfileUpdate) -> Self {
        Self {
            first_name: p.first_name,
            last_name: p.last_name,
            department: p.department,
            position: p.position,
            profile_picture_url: p.profile_picture_url,
            two_factor_enabled: p.two_factor_enabled,
            ..Default::default()
        }
    }
}
