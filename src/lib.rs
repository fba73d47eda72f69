//! Kinship Family Tree Server
//!
//! A collaborative genealogy engine: users share *family spaces*, add
//! people and typed relationships, and read server-computed tree views.
//! Authorization is role-based (OWNER/EDITOR/VIEWER) with a claim workflow
//! that links a user to a tree node and grants edit rights over that
//! person's descendant branch.
//!
//! # Architecture
//!
//! - `graph` — per-space family graph: people, typed relationship edges,
//!   adjacency indexes
//! - `algo` — branch descendant sets and bounded tree visibility
//! - `layout` — layered placement of the visible subgraph
//! - `space` — tenancy: spaces, memberships, roles, claims, invitations
//! - `persistence` — JSON snapshots, one file per space
//! - `http` — axum API surface
//!
//! # Example Usage
//!
//! ```rust
//! use kinship::graph::PersonInput;
//! use kinship::space::SpaceManager;
//!
//! let manager = SpaceManager::new();
//! let owner = manager.register_user("owner@family.test", "Owner").unwrap();
//! let space = manager.create_space(&owner.id, "My Family", None).unwrap();
//!
//! let person = manager
//!     .create_person(
//!         &space.id,
//!         &owner.id,
//!         PersonInput {
//!             first_name: "Ahmad".to_string(),
//!             last_name: "Aoudi".to_string(),
//!             ..Default::default()
//!         },
//!     )
//!     .unwrap();
//! assert_eq!(person.full_name(), "Ahmad Aoudi");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod graph;
pub mod http;
pub mod layout;
pub mod persistence;
pub mod seed;
pub mod space;

// Re-export main types for convenience
pub use graph::{
    FamilyGraph, Gender, GraphError, GraphResult, Lineage, Person, PersonId, PersonInput,
    PersonPatch, Relationship, RelationshipId, RelationshipInput, RelationshipKind, SpouseKind,
};

pub use algo::{branch, descendants, visible_tree, TreeMode, VisibleTree};

pub use layout::{layout, EdgeClass, LayoutEdge, PlacedPerson, TreeLayout};

pub use space::{
    ClaimId, ClaimRequest, ClaimStatus, EffectiveRole, FamilySpace, Invitation, Membership,
    Role, SpaceError, SpaceId, SpaceManager, SpaceQuotas, SpaceResult, User, UserId,
};

pub use persistence::{SnapshotError, SnapshotResult, SnapshotStore};

pub use config::ServerConfig;

pub use http::{router, HttpServer};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
