//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of roles a user can hold.
///
/// Roles are not hierarchical. Route guards name the roles they accept,
/// and only `Admin` receives implicit access to permission-gated actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    /// Full system administrator.
    Admin,
    /// Dispatch and scheduling staff.
    #[serde(rename = "Operations Manager")]
    #[sqlx(rename = "Operations Manager")]
    OperationsManager,
    /// Field personnel.
    Guard,
    /// Customer account.
    Client,
}

impl UserRole {
    /// Every role, in declaration order.
    pub const ALL: [UserRole; 4] = [
        Self::Admin,
        Self::OperationsManager,
        Self::Guard,
        Self::Client,
    ];

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as its canonical display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::OperationsManager => "Operations Manager",
            Self::Guard => "Guard",
            Self::Client => "Client",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = guardpost_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                guardpost_core::AppError::validation(format!(
                    "Invalid role: '{s}'. Expected one of: Admin, Operations Manager, Guard, Client"
                ))
            })
    }
}
