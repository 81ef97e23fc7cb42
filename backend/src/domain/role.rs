//! Role hierarchy governing which users a requester may see and manage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Privilege level of a user.
///
/// Roles are totally ordered by their ordinal, where a lower ordinal is more
/// privileged: `Admin (0) > Manager (1) > User (2)`. Serialises as the
/// lowercase role name.
///
/// # Examples
/// ```
/// use recordkeeper::domain::Role;
///
/// assert!(Role::Admin.outranks(Role::Manager));
/// assert!(!Role::Manager.can_assign(Role::Admin));
/// assert!(Role::Manager.can_assign(Role::Manager));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Manages users of equal or lower rank.
    Manager,
    /// Regular account.
    User,
}

/// Raised when text or a stored ordinal does not name a role.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleParseError {
    /// Unrecognised role name.
    #[error("role must be one of admin, manager or user")]
    UnknownName,
    /// Stored ordinal outside the hierarchy.
    #[error("role ordinal {0} is out of range")]
    UnknownOrdinal(i16),
}

impl Role {
    /// Every role, most privileged first.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Manager, Self::User];

    /// Position in the hierarchy; lower is more privileged.
    #[must_use]
    pub const fn ordinal(self) -> i16 {
        match self {
            Self::Admin => 0,
            Self::Manager => 1,
            Self::User => 2,
        }
    }

    /// Rebuild a role from its stored ordinal.
    ///
    /// # Errors
    /// Returns [`RoleParseError::UnknownOrdinal`] for values outside `0..=2`.
    pub const fn from_ordinal(ordinal: i16) -> Result<Self, RoleParseError> {
        match ordinal {
            0 => Ok(Self::Admin),
            1 => Ok(Self::Manager),
            2 => Ok(Self::User),
            other => Err(RoleParseError::UnknownOrdinal(other)),
        }
    }

    /// Whether `self` is strictly more privileged than `other`.
    #[must_use]
    pub const fn outranks(self, other: Self) -> bool {
        self.ordinal() < other.ordinal()
    }

    /// Whether a holder of `self` may grant `role` to someone.
    #[must_use]
    pub const fn can_assign(self, role: Self) -> bool {
        !role.outranks(self)
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or(RoleParseError::UnknownName)
    }
}
