//! Membership roles and their hierarchy

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored membership role, ordered `Viewer < Editor < Owner`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Viewer,
    Editor,
    Owner,
}

impl Default for Role {
    fn default() -> Self {
        Role::Viewer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Viewer => "VIEWER",
            Role::Editor => "EDITOR",
            Role::Owner => "OWNER",
        };
        write!(f, "{s}")
    }
}

/// Role as seen at read time
///
/// `Claimer` is never stored; it is derived for a user whose approved claim
/// link grants branch edit rights while their membership (if any) grants
/// less than `Editor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EffectiveRole {
    Owner,
    Editor,
    Claimer,
    Viewer,
}

impl From<Role> for EffectiveRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Owner => EffectiveRole::Owner,
            Role::Editor => EffectiveRole::Editor,
            Role::Viewer => EffectiveRole::Viewer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::Viewer < Role::Editor);
        assert!(Role::Editor < Role::Owner);
        assert!(Role::Owner >= Role::Editor);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), r#""OWNER""#);
        let role: Role = serde_json::from_str(r#""EDITOR""#).unwrap();
        assert_eq!(role, Role::Editor);
    }
}
