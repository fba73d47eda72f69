//! Focus-based tree visibility
//!
//! Computes which people are shown for a given focal person, view mode and
//! generation bound. Expansion is breadth-first across parent, child and
//! spouse edges; spouse hops stay within the current generation, only
//! parent/child hops consume generation budget. A person can be reached
//! going up and going down independently, so visited state is keyed by
//! (person, direction).

use crate::graph::{FamilyGraph, PersonId, Relationship};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default generation bound for tree views
pub const DEFAULT_GENERATIONS: u32 = 3;

/// Which part of the family to expand from the focal person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMode {
    Ancestors,
    Descendants,
    Mixed,
}

impl Default for TreeMode {
    fn default() -> Self {
        TreeMode::Mixed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Direction {
    Up,
    Down,
}

/// A person included in the visible tree, with display flags
#[derive(Debug, Clone, Serialize)]
pub struct VisiblePerson {
    pub id: PersonId,
    /// True for the focal person
    pub focused: bool,
    /// Flags against the full graph, so a client can offer expansion
    pub has_parents: bool,
    pub has_children: bool,
}

/// Result of a visibility computation
#[derive(Debug, Clone)]
pub struct VisibleTree {
    /// Visible people in graph insertion order
    pub people: Vec<VisiblePerson>,
    ids: FxHashSet<PersonId>,
}

impl VisibleTree {
    pub fn contains(&self, id: PersonId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &FxHashSet<PersonId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

/// Compute the visible subgraph for a tree view
///
/// Without a focus (or when the focus id is unknown) every person is
/// visible. With a focus, expansion follows `mode`: `Ancestors` climbs
/// parent edges only, `Descendants` walks child edges only, `Mixed` does
/// both, always picking up spouses along the way.
pub fn visible_tree(
    graph: &FamilyGraph,
    focus: Option<PersonId>,
    mode: TreeMode,
    generations: u32,
) -> VisibleTree {
    let focus = focus.filter(|id| graph.contains_person(*id));

    let ids = match focus {
        None => graph.people().map(|p| p.id).collect(),
        Some(start) => expand(graph, start, mode, generations),
    };

    let people = graph
        .people()
        .filter(|p| ids.contains(&p.id))
        .map(|p| VisiblePerson {
            id: p.id,
            focused: focus == Some(p.id),
            has_parents: !graph.parents_of(p.id).is_empty(),
            has_children: !graph.children_of(p.id).is_empty(),
        })
        .collect();

    VisibleTree { people, ids }
}

fn expand(
    graph: &FamilyGraph,
    start: PersonId,
    mode: TreeMode,
    generations: u32,
) -> FxHashSet<PersonId> {
    let mut visible = FxHashSet::default();
    let mut visited: FxHashSet<(PersonId, Direction)> = FxHashSet::default();
    let mut queue: VecDeque<(PersonId, u32, Direction)> = VecDeque::new();
    queue.push_back((start, 0, Direction::Down));

    while let Some((id, depth, direction)) = queue.pop_front() {
        if !visited.insert((id, direction)) {
            continue;
        }
        visible.insert(id);

        if depth >= generations {
            continue;
        }

        // Spouses join at the current generation and inherit direction
        for spouse in graph.spouses_of(id) {
            visible.insert(spouse);
            queue.push_back((spouse, depth, direction));
        }

        if mode != TreeMode::Descendants {
            for parent in graph.parents_of(id) {
                queue.push_back((parent, depth + 1, Direction::Up));
            }
        }

        if mode != TreeMode::Ancestors {
            for child in graph.children_of(id) {
                queue.push_back((child, depth + 1, Direction::Down));
            }
        }
    }

    visible
}

/// Relationships with both endpoints visible
pub fn visible_relationships<'a>(
    graph: &'a FamilyGraph,
    tree: &VisibleTree,
) -> Vec<&'a Relationship> {
    graph
        .relationships()
        .filter(|rel| tree.contains(rel.from) && tree.contains(rel.to))
        .collect()
}
