//! User roles and role-gated access.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::claims::Identity;
use crate::error::{Error, InvalidInputError};

/// The closed set of roles the API assigns to users.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    #[default]
    Participant,
    Organizer,
    Admin,
}

impl Role {
    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Participant => "participant",
            Role::Organizer => "organizer",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "participant" => Ok(Role::Participant),
            "organizer" => Ok(Role::Organizer),
            "admin" => Ok(Role::Admin),
            _ => Err(InvalidInputError::Role {
                value: s.to_string(),
            }
            .into()),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a role check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// The identity holds one of the allowed roles.
    Granted,
    /// Nobody is logged in; send the user to login.
    Unauthenticated,
    /// Logged in, but the role is not allowed.
    Forbidden,
}

impl Access {
    /// Check an identity against a set of allowed roles.
    ///
    /// # Example
    ///
    /// ```
    /// use evently_core::{Access, Role};
    ///
    /// assert_eq!(Access::check(None, &[Role::Admin]), Access::Unauthenticated);
    /// ```
    pub fn check(identity: Option<&Identity>, allowed: &[Role]) -> Self {
        match identity {
            None => Access::Unauthenticated,
            Some(identity) if allowed.contains(&identity.role) => Access::Granted,
            Some(_) => Access::Forbidden,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}
