//! Branch traversal for claim-based edit permissions
//!
//! A claimer may edit their claimed person and everyone below them in the
//! parent-child hierarchy. The descendant set is computed by breadth-first
//! search over parent-child edges only; spouse edges never extend a branch.

use crate::graph::{FamilyGraph, PersonId};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// All descendants of a person, excluding the person themselves
pub fn descendants(graph: &FamilyGraph, person: PersonId) -> FxHashSet<PersonId> {
    let mut found = FxHashSet::default();
    let mut queue = VecDeque::new();
    queue.push_back(person);

    while let Some(current) = queue.pop_front() {
        for child in graph.children_of(current) {
            if found.insert(child) {
                queue.push_back(child);
            }
        }
    }

    found
}

/// A person's branch: the person plus all of their descendants
pub fn branch(graph: &FamilyGraph, person: PersonId) -> FxHashSet<PersonId> {
    let mut set = descendants(graph, person);
    set.insert(person);
    set
}
