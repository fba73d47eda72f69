//! Graph traversals over the family graph
//!
//! - Branch descendant sets, the basis of claim-scoped edit permissions
//! - Focus-based tree visibility with a generation bound

pub mod branch;
pub mod visibility;

pub use branch::{branch, descendants};
pub use visibility::{
    visible_relationships, visible_tree, TreeMode, VisiblePerson, VisibleTree,
    DEFAULT_GENERATIONS,
};
