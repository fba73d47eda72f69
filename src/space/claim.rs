//! Identity claim requests
//!
//! A claim asserts "this tree node is me". Approval by a space owner links
//! the user to the person and grants branch edit rights over the person's
//! descendants.

use super::user::UserId;
use crate::graph::{now_millis, PersonId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a claim request within a space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ClaimId(pub u64);

impl ClaimId {
    pub fn new(id: u64) -> Self {
        ClaimId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimId({})", self.0)
    }
}

/// Lifecycle of a claim request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

/// A user's request to be linked to a person
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub id: ClaimId,
    pub user_id: UserId,
    pub person_id: PersonId,
    pub status: ClaimStatus,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl ClaimRequest {
    pub fn new(id: ClaimId, user_id: UserId, person_id: PersonId) -> Self {
        ClaimRequest {
            id,
            user_id,
            person_id,
            status: ClaimStatus::Pending,
            created_at: now_millis(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ClaimStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claim_is_pending() {
        let claim = ClaimRequest::new(ClaimId::new(1), UserId::from("u1"), PersonId::new(3));
        assert!(claim.is_pending());
        assert_eq!(claim.status, ClaimStatus::Pending);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ClaimStatus::Pending).unwrap();
        assert_eq!(json, r#""PENDING""#);
    }
}
