use crate::errors::AppError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const USERS_HEADER: [&str; 5] = ["username", "password_hash", "full_name", "role", "active"];

/// Capability level. Ordering is `Viewer < Editor < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "Viewer",
            Role::Editor => "Editor",
            Role::Admin => "Admin",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            _ => Err(AppError::InvalidRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    /// Stored trimmed and lowercased.
    pub username: String,
    /// Opaque to the store.
    pub password_hash: String,
    pub full_name: String,
    /// `None` when the stored role text is not a known role.
    pub role: Option<Role>,
    pub active: bool,
}

impl UserRecord {
    pub fn role_label(&self) -> &str {
        self.role.map(|r| r.as_str()).unwrap_or("?")
    }
}

pub fn parse_active_flag(s: &str) -> bool {
    matches!(s.trim().to_uppercase().as_str(), "Y" | "YES" | "TRUE" | "1")
}

pub fn active_flag(active: bool) -> &'static str {
    if active { "Y" } else { "N" }
}
