//! Family graph data model
//!
//! One property graph per family space:
//! - People with bilingual name fields, life years and privacy flags
//! - Directed relationship edges (parent-child with lineage subtypes,
//!   spouse with marriage subtypes)
//! - Insertion-ordered storage with adjacency indexes for traversal

pub mod person;
pub mod relationship;
pub mod store;
pub mod types;

// Re-export main types
pub use person::{Person, PersonInput, PersonPatch};
pub use relationship::Relationship;
pub use store::{FamilyGraph, GraphError, GraphResult, GraphSnapshot, RelationshipInput};
pub use types::{Gender, Lineage, PersonId, RelationshipId, RelationshipKind, SpouseKind};

/// Current wall-clock time as Unix milliseconds
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
