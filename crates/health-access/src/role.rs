//! Roles and principals presented to the access policy

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Role types for role-based access control
///
/// Closed set: anything outside these four is rejected at parse time, so the
/// policy can never be asked about a role it has no rules for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Nurse,
    Doctor,
    Admin,
    Patient,
}

impl Role {
    /// All roles, in table order
    pub const ALL: [Role; 4] = [Role::Nurse, Role::Doctor, Role::Admin, Role::Patient];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Nurse => "nurse",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
            Role::Patient => "patient",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a role string names none of the known roles
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nurse" => Ok(Role::Nurse),
            "doctor" => Ok(Role::Doctor),
            "admin" => Ok(Role::Admin),
            "patient" => Ok(Role::Patient),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// An authenticated caller as supplied by the user layer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn test_role_parse_is_exact() {
        assert_eq!("Nurse".parse::<Role>(), Err(UnknownRole("Nurse".to_string())));
        assert!("".parse::<Role>().is_err());
        assert!("superuser".parse::<Role>().is_err());
        assert!(" admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Doctor).unwrap();
        assert_eq!(json, "\"doctor\"");
        let back: Role = serde_json::from_str("\"patient\"").unwrap();
        assert_eq!(back, Role::Patient);
    }

    #[test]
    fn test_principal_keeps_role() {
        let p = Principal::new("u-17", Role::Nurse);
        assert_eq!(p.id, "u-17");
        assert_eq!(p.role, Role::Nurse);
    }
}
