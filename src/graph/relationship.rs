//! Relationship edges for the family graph

use super::now_millis;
use super::types::{PersonId, RelationshipId, RelationshipKind};
use serde::{Deserialize, Serialize};

/// A directed relationship edge between two persons
///
/// For parent-child edges `from` is the parent and `to` the child. Spouse
/// edges keep their stored direction but are symmetric for traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier within the owning space
    pub id: RelationshipId,

    pub kind: RelationshipKind,

    /// Source person (parent for parent-child edges)
    pub from: PersonId,
    /// Target person (child for parent-child edges)
    pub to: PersonId,

    /// Year the relationship started (e.g. marriage year)
    #[serde(default)]
    pub start_year: Option<i32>,
    /// Year the relationship ended
    #[serde(default)]
    pub end_year: Option<i32>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Relationship {
    /// Create a new relationship edge
    pub fn new(id: RelationshipId, from: PersonId, to: PersonId, kind: RelationshipKind) -> Self {
        Relationship {
            id,
            kind,
            from,
            to,
            start_year: None,
            end_year: None,
            created_at: now_millis(),
        }
    }

    /// Check if this edge connects two persons in either direction
    pub fn connects(&self, a: PersonId, b: PersonId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    /// Check if this edge touches a person on either end
    pub fn touches(&self, person: PersonId) -> bool {
        self.from == person || self.to == person
    }

    /// The other endpoint, if `person` is one of the two
    pub fn other(&self, person: PersonId) -> Option<PersonId> {
        if self.from == person {
            Some(self.to)
        } else if self.to == person {
            Some(self.from)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{Lineage, SpouseKind};

    #[test]
    fn test_connects_and_touches() {
        let rel = Relationship::new(
            RelationshipId::new(1),
            PersonId::new(1),
            PersonId::new(2),
            RelationshipKind::ParentChild(Lineage::Biological),
        );

        assert!(rel.connects(PersonId::new(1), PersonId::new(2)));
        assert!(rel.connects(PersonId::new(2), PersonId::new(1)));
        assert!(!rel.connects(PersonId::new(1), PersonId::new(3)));
        assert!(rel.touches(PersonId::new(2)));
        assert!(!rel.touches(PersonId::new(3)));
    }

    #[test]
    fn test_other_endpoint() {
        let rel = Relationship::new(
            RelationshipId::new(1),
            PersonId::new(5),
            PersonId::new(7),
            RelationshipKind::Spouse(SpouseKind::Married),
        );

        assert_eq!(rel.other(PersonId::new(5)), Some(PersonId::new(7)));
        assert_eq!(rel.other(PersonId::new(7)), Some(PersonId::new(5)));
        assert_eq!(rel.other(PersonId::new(9)), None);
    }
}
