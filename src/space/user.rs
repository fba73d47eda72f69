//! User directory entries
//!
//! Authentication lives upstream; this crate only keeps the directory
//! needed to attribute memberships and claims. E-mail addresses are
//! normalized before hashing and masked when shown to non-owners.

use crate::graph::now_millis;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct UserId(pub String);

impl UserId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        UserId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// SHA-256 of the normalized address
    pub email_hash: String,
    pub name: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl User {
    /// Create a user with a generated id; the stored e-mail is normalized
    pub fn new(email: &str, name: impl Into<String>) -> Self {
        let email = normalize_email(email);
        let email_hash = hash_email(&email);
        User {
            id: UserId::generate(),
            email,
            email_hash,
            name: name.into(),
            created_at: now_millis(),
        }
    }

    /// E-mail with the local part masked, e.g. `a***@example.com`
    pub fn masked_email(&self) -> String {
        mask_email(&self.email)
    }
}

/// Trim and lowercase an address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hex SHA-256 digest of a normalized address
pub fn hash_email(email: &str) -> String {
    format!("{:x}", Sha256::digest(normalize_email(email).as_bytes()))
}

/// Mask the local part, keeping its first character
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap();
            format!("{first}***@{domain}")
        }
        _ => "***".to_string(),
    }
}
