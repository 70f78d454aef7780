use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Staff,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A user identity row.
///
/// `user_id` is a durable sequential 7-digit string, immutable after
/// creation and never reused. The PIN hash is a one-way argon2 PHC string;
/// the plaintext is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,

    pub role: Role,

    /// Argon2 PHC hash of the login PIN. Withheld from public responses.
    pub pin_hash: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp. Set on every mutation.
    pub updated_at: String,

    /// Soft-delete flag. Deleted rows are excluded from normal lookups
    /// but kept in storage.
    #[serde(default)]
    pub is_deleted: bool,
}

/// User shape for API responses — everything except the credential hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub user_id: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            role: user.role,
            created_at: user.created_at.clone(),
            updated_at: user.updated_at.clone(),
        }
    }
}

/// Input for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub role: Role,

    /// Optional caller-supplied PIN (exactly 6 digits). When absent or
    /// empty, the system generates one and returns it exactly once.
    #[serde(default)]
    pub pin: Option<String>,
}

/// Input for updating a user's role.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRole {
    pub role: Role,
}

/// PIN login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
    pub pin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Student, Role::Staff, Role::Admin, Role::SuperAdmin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_case_insensitive() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Super_Admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("guest".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
        let role: Role = serde_json::from_str("\"staff\"").unwrap();
        assert_eq!(role, Role::Staff);
    }

    #[test]
    fn test_user_public_withholds_hash() {
        let user = User {
            user_id: "1000005".into(),
            role: Role::Student,
            pin_hash: "$argon2id$...".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
            is_deleted: false,
        };
        let public = serde_json::to_value(UserPublic::from(&user)).unwrap();
        assert!(public.get("pin_hash").is_none());
        assert_eq!(public["user_id"], "1000005");
    }
}
