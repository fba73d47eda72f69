//! Core type definitions for the family graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a person within a family space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PersonId(pub u64);

impl PersonId {
    pub fn new(id: u64) -> Self {
        PersonId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersonId({})", self.0)
    }
}

impl From<u64> for PersonId {
    fn from(id: u64) -> Self {
        PersonId(id)
    }
}

/// Unique identifier for a relationship within a family space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct RelationshipId(pub u64);

impl RelationshipId {
    pub fn new(id: u64) -> Self {
        RelationshipId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelationshipId({})", self.0)
    }
}

impl From<u64> for RelationshipId {
    fn from(id: u64) -> Self {
        RelationshipId(id)
    }
}

/// Gender of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Subtype of a parent-child relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lineage {
    Biological,
    Adoptive,
    Guardian,
    Step,
}

impl Default for Lineage {
    fn default() -> Self {
        Lineage::Biological
    }
}

/// Subtype of a spouse relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpouseKind {
    Married,
    Partner,
}

impl Default for SpouseKind {
    fn default() -> Self {
        SpouseKind::Married
    }
}

/// Kind of a relationship edge
///
/// Parent-child edges are directed parent -> child. Spouse edges are stored
/// directed but treated as symmetric by every traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "subtype", rename_all = "snake_case")]
pub enum RelationshipKind {
    ParentChild(Lineage),
    Spouse(SpouseKind),
}

impl RelationshipKind {
    /// Check if this is a parent-child edge
    pub fn is_parent_child(&self) -> bool {
        matches!(self, RelationshipKind::ParentChild(_))
    }

    /// Check if this is a spouse edge
    pub fn is_spouse(&self) -> bool {
        matches!(self, RelationshipKind::Spouse(_))
    }

    /// Get the lineage subtype if this is a parent-child edge
    pub fn lineage(&self) -> Option<Lineage> {
        match self {
            RelationshipKind::ParentChild(l) => Some(*l),
            _ => None,
        }
    }

    /// Get the spouse subtype if this is a spouse edge
    pub fn spouse_kind(&self) -> Option<SpouseKind> {
        match self {
            RelationshipKind::Spouse(k) => Some(*k),
            _ => None,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::ParentChild(l) => write!(f, "PARENT_CHILD({:?})", l),
            RelationshipKind::Spouse(k) => write!(f, "SPOUSE({:?})", k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_id() {
        let id = PersonId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(format!("{}", id), "PersonId(42)");

        let id2: PersonId = 100.into();
        assert_eq!(id2.as_u64(), 100);
    }

    #[test]
    fn test_relationship_id() {
        let id = RelationshipId::new(99);
        assert_eq!(id.as_u64(), 99);
        assert_eq!(format!("{}", id), "RelationshipId(99)");
    }

    #[test]
    fn test_kind_accessors() {
        let pc = RelationshipKind::ParentChild(Lineage::Adoptive);
        assert!(pc.is_parent_child());
        assert!(!pc.is_spouse());
        assert_eq!(pc.lineage(), Some(Lineage::Adoptive));
        assert_eq!(pc.spouse_kind(), None);

        let sp = RelationshipKind::Spouse(SpouseKind::Partner);
        assert!(sp.is_spouse());
        assert_eq!(sp.spouse_kind(), Some(SpouseKind::Partner));
    }

    #[test]
    fn test_kind_serialization() {
        let pc = RelationshipKind::ParentChild(Lineage::Biological);
        let json = serde_json::to_string(&pc).unwrap();
        assert_eq!(json, r#"{"type":"parent_child","subtype":"biological"}"#);

        let back: RelationshipKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pc);
    }

    #[test]
    fn test_id_ordering() {
        let id1 = PersonId::new(1);
        let id2 = PersonId::new(2);
        assert!(id1 < id2);
    }
}
