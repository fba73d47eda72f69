//! Space invitations
//!
//! An invitation is a single-use token granting membership at a fixed role.
//! Token delivery (links, e-mail) is out of scope; tokens here are plain
//! UUID randomness.

use super::role::Role;
use crate::graph::now_millis;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invitation lifetime: 7 days
pub const INVITATION_TTL_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// A single-use membership invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    /// Opaque token, also the invitation's identity
    pub token: String,
    /// Role granted on acceptance
    pub role: Role,
    pub used: bool,
    /// Expiry timestamp (Unix milliseconds)
    pub expires_at: i64,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Invitation {
    /// Create a fresh invitation valid for [`INVITATION_TTL_MILLIS`]
    pub fn new(role: Role) -> Self {
        let now = now_millis();
        Invitation {
            token: Uuid::new_v4().simple().to_string(),
            role,
            used: false,
            expires_at: now + INVITATION_TTL_MILLIS,
            created_at: now,
        }
    }

    /// Usable right now: neither spent nor expired
    pub fn is_valid(&self, now: i64) -> bool {
        !self.used && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_invitation_is_valid() {
        let invite = Invitation::new(Role::Viewer);
        assert!(invite.is_valid(now_millis()));
        assert_eq!(invite.token.len(), 32);
    }

    #[test]
    fn test_used_invitation_is_invalid() {
        let mut invite = Invitation::new(Role::Viewer);
        invite.used = true;
        assert!(!invite.is_valid(now_millis()));
    }

    #[test]
    fn test_expired_invitation_is_invalid() {
        let invite = Invitation::new(Role::Editor);
        assert!(!invite.is_valid(invite.expires_at));
        assert!(invite.is_valid(invite.expires_at - 1));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = Invitation::new(Role::Viewer);
        let b = Invitation::new(Role::Viewer);
        assert_ne!(a.token, b.token);
    }
}
