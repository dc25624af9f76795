//! Platform roles.
//!
//! Crewbase assigns every user exactly one role. Roles form a closed
//! enumeration so that authorization decisions are capability predicates on
//! this type rather than string comparisons scattered across call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of Crewbase platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform-level operator account. There is one per installation.
    SuperAdmin,
    /// Administrator of a single organization (tenant).
    OrgAdmin,
    /// Organization staff member coordinating drivers and vehicles.
    Dispatcher,
    /// Regular organization employee.
    Employee,
    /// Driver account, typically used from the mobile app.
    Driver,
}

impl Role {
    /// Returns the wire representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::OrgAdmin => "org_admin",
            Self::Dispatcher => "dispatcher",
            Self::Employee => "employee",
            Self::Driver => "driver",
        }
    }

    /// Parses a role from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`RoleParseError`] if the string is not a known role name.
    pub fn parse(s: &str) -> Result<Self, RoleParseError> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "org_admin" => Ok(Self::OrgAdmin),
            "dispatcher" => Ok(Self::Dispatcher),
            "employee" => Ok(Self::Employee),
            "driver" => Ok(Self::Driver),
            other => Err(RoleParseError {
                value: other.to_string(),
            }),
        }
    }

    /// Returns `true` if the role is exempt from forced logout.
    ///
    /// When the server advances a user's session version, clients holding
    /// older tokens log themselves out on the next observed mismatch. The
    /// platform operator account is exempt so that a mass invalidation can
    /// never lock the operator out of their own installation.
    ///
    /// Note that the exemption weakens the session-invalidation guarantee
    /// for the most privileged account: a stolen super-admin token is not
    /// evicted by a version bump and must be revoked directly.
    #[must_use]
    pub fn is_exempt_from_forced_logout(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Returns `true` if the role may administer other users' sessions.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::OrgAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown role: {value}")]
pub struct RoleParseError {
    /// The string that failed to parse.
    pub value: String,
}
