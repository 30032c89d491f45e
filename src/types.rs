/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Global role stored on every user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    Admin,
    Member,
}

impl GlobalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::Admin => "admin",
            GlobalRole::Member => "member",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, GlobalRole::Admin)
    }
}

/// Role of a user inside a single team or project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    Lead,
    Member,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Lead => "lead",
            MembershipRole::Member => "member",
        }
    }
}

impl Default for MembershipRole {
    fn default() -> Self {
        MembershipRole::Member
    }
}

/// Resources that carry memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Team,
    Project,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Team => "Team",
            ResourceKind::Project => "Project",
        }
    }

    pub(crate) fn table(&self) -> &'static str {
        match self {
            ResourceKind::Team => "teams",
            ResourceKind::Project => "projects",
        }
    }

    pub(crate) fn membership_table(&self) -> &'static str {
        match self {
            ResourceKind::Team => "team_users",
            ResourceKind::Project => "project_users",
        }
    }

    pub(crate) fn membership_column(&self) -> &'static str {
        match self {
            ResourceKind::Team => "team_id",
            ResourceKind::Project => "project_id",
        }
    }
}

/// Whether single-resource reads of teams/projects go through the lead check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPolicy {
    /// Any authenticated user may read a team or project
    Public,
    /// Only admins and leads of the resource may read it
    Lead,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for GlobalRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(GlobalRole::Admin),
            "member" => Ok(GlobalRole::Member),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl FromStr for MembershipRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" => Ok(MembershipRole::Lead),
            "member" => Ok(MembershipRole::Member),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl FromStr for ReadPolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(ReadPolicy::Public),
            "lead" | "gated" => Ok(ReadPolicy::Lead),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

// sqlx `try_from = "String"` hooks for role columns
impl TryFrom<String> for GlobalRole {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for MembershipRole {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_strings() {
        assert_eq!("admin".parse::<GlobalRole>().unwrap(), GlobalRole::Admin);
        assert_eq!(MembershipRole::Lead.as_str(), "lead");
        assert!("owner".parse::<MembershipRole>().is_err());
    }

    #[test]
    fn read_policy_accepts_gated_alias() {
        assert_eq!("GATED".parse::<ReadPolicy>().unwrap(), ReadPolicy::Lead);
        assert_eq!("public".parse::<ReadPolicy>().unwrap(), ReadPolicy::Public);
    }

    #[test]
    fn membership_role_deserializes_lowercase() {
        let role: MembershipRole = serde_json::from_str("\"lead\"").unwrap();
        assert_eq!(role, MembershipRole::Lead);
    }
}
