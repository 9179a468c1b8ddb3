use crate::utils::text::{normalize_name, normalize_phone};
use std::fmt;

/// Caller-supplied identity of a business record, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub phone: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    pub fn key(&self) -> IdentityKey {
        IdentityKey::from_parts(&self.name, &self.phone)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name.trim(), self.phone.trim())
    }
}

/// Normalized `(name, phone)` pair. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub name: String,
    pub phone: String,
}

impl IdentityKey {
    pub fn from_parts(name: &str, phone: &str) -> Self {
        Self {
            name: normalize_name(name),
            phone: normalize_phone(phone),
        }
    }
}
