//! Hierarchical layout for tree views
//!
//! Places the visible subgraph on a layered canvas: spouse pairs are
//! coalesced into one slot, ranks come from a topological layering of the
//! parent-child digraph, within-rank order is refined by barycenter sweeps,
//! and coordinates fall out of rank and order. The output is plain
//! placement data; rendering stays on the client.

use crate::algo::visibility::{visible_relationships, TreeMode, VisibleTree};
use crate::graph::{FamilyGraph, Gender, Lineage, PersonId, RelationshipId};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Node box width in canvas units
pub const NODE_WIDTH: f64 = 220.0;
/// Node box height
pub const NODE_HEIGHT: f64 = 80.0;
/// Vertical distance between ranks
pub const RANK_SEP: f64 = 100.0;
/// Horizontal distance between slots in a rank
pub const NODE_SEP: f64 = 60.0;
/// Gap between a primary and its spouse partner
pub const SPOUSE_GAP: f64 = 40.0;
/// Canvas margin on every side
pub const MARGIN: f64 = 40.0;

/// Placement of one visible person
#[derive(Debug, Clone, Serialize)]
pub struct PlacedPerson {
    pub id: PersonId,
    /// Left edge of the node box
    pub x: f64,
    /// Top edge of the node box
    pub y: f64,
    /// Generation layer, 0 at the oldest visible generation
    pub rank: u32,
}

/// Render class of a visible edge
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeClass {
    /// Parent-child edge; `paternal` reflects the parent's gender
    ParentChild { lineage: Lineage, paternal: bool },
    Spouse,
}

/// A visible edge with its render class
#[derive(Debug, Clone, Serialize)]
pub struct LayoutEdge {
    pub id: RelationshipId,
    pub from: PersonId,
    pub to: PersonId,
    #[serde(flatten)]
    pub class: EdgeClass,
}

/// Result of a layout pass
#[derive(Debug, Clone, Serialize)]
pub struct TreeLayout {
    pub nodes: Vec<PlacedPerson>,
    pub edges: Vec<LayoutEdge>,
    /// Overall canvas size including margins
    pub width: f64,
    pub height: f64,
}

/// Lay out the visible subgraph
pub fn layout(graph: &FamilyGraph, tree: &VisibleTree, mode: TreeMode) -> TreeLayout {
    if tree.is_empty() {
        return TreeLayout {
            nodes: Vec::new(),
            edges: Vec::new(),
            width: 2.0 * MARGIN,
            height: 2.0 * MARGIN,
        };
    }

    let rels = visible_relationships(graph, tree);

    // Coalesce spouse pairs: the partner drops out of layering and is
    // placed beside its primary afterwards. One partner per primary.
    let mut partner_of: FxHashMap<PersonId, PersonId> = FxHashMap::default(); // partner -> primary
    let mut primaries: FxHashSet<PersonId> = FxHashSet::default();
    for rel in rels.iter().filter(|r| r.kind.is_spouse()) {
        let (a, b) = (rel.from, rel.to);
        if partner_of.contains_key(&a) || partner_of.contains_key(&b) {
            continue;
        }
        if primaries.contains(&b) || primaries.contains(&a) {
            continue;
        }
        primaries.insert(a);
        partner_of.insert(b, a);
    }

    let resolve = |id: PersonId| *partner_of.get(&id).unwrap_or(&id);

    // Members of the layered digraph, in graph insertion order
    let members: Vec<PersonId> = tree
        .people
        .iter()
        .map(|p| p.id)
        .filter(|id| !partner_of.contains_key(id))
        .collect();
    let member_set: FxHashSet<PersonId> = members.iter().copied().collect();

    // Parent-child edges rerouted through primaries, deduplicated
    let mut succs: FxHashMap<PersonId, Vec<PersonId>> = FxHashMap::default();
    let mut preds: FxHashMap<PersonId, Vec<PersonId>> = FxHashMap::default();
    let mut seen_edges: FxHashSet<(PersonId, PersonId)> = FxHashSet::default();
    for rel in rels.iter().filter(|r| r.kind.is_parent_child()) {
        let (src, tgt) = (resolve(rel.from), resolve(rel.to));
        if src == tgt || !member_set.contains(&src) || !member_set.contains(&tgt) {
            continue;
        }
        if seen_edges.insert((src, tgt)) {
            succs.entry(src).or_default().push(tgt);
            preds.entry(tgt).or_default().push(src);
        }
    }

    let ranks = assign_ranks(&members, &succs, &preds);
    let max_rank = ranks.values().copied().max().unwrap_or(0);

    // Group members by rank, then refine the order with barycenter sweeps
    let mut by_rank: Vec<Vec<PersonId>> = vec![Vec::new(); (max_rank + 1) as usize];
    for id in &members {
        by_rank[ranks[id] as usize].push(*id);
    }
    barycenter_sweeps(&mut by_rank, &succs, &preds);

    // Slot widths: a primary with a partner reserves double width plus gap
    let slot_width = |id: PersonId| {
        if primaries.contains(&id) {
            2.0 * NODE_WIDTH + SPOUSE_GAP
        } else {
            NODE_WIDTH
        }
    };

    // X coordinates per rank, ranks centered against the widest one
    let rank_width = |row: &[PersonId]| -> f64 {
        if row.is_empty() {
            return 0.0;
        }
        row.iter().map(|id| slot_width(*id)).sum::<f64>()
            + NODE_SEP * (row.len() as f64 - 1.0)
    };
    let widest = by_rank
        .iter()
        .map(|row| rank_width(row))
        .fold(0.0_f64, f64::max);

    let mut positions: FxHashMap<PersonId, (f64, f64, u32)> = FxHashMap::default();
    for (rank, row) in by_rank.iter().enumerate() {
        let rank = rank as u32;
        // Oldest generation at the top; ancestors mode flips the axis so
        // the focal person ends up on top instead
        let visual_rank = match mode {
            TreeMode::Ancestors => max_rank - rank,
            _ => rank,
        };
        let y = MARGIN + visual_rank as f64 * (NODE_HEIGHT + RANK_SEP);

        let mut cursor = MARGIN + (widest - rank_width(row)) / 2.0;
        for id in row {
            positions.insert(*id, (cursor, y, rank));
            cursor += slot_width(*id) + NODE_SEP;
        }
    }

    // Partners sit beside their primary
    for (partner, primary) in &partner_of {
        if let Some(&(x, y, rank)) = positions.get(primary) {
            positions.insert(*partner, (x + NODE_WIDTH + SPOUSE_GAP, y, rank));
        }
    }

    let nodes: Vec<PlacedPerson> = tree
        .people
        .iter()
        .filter_map(|p| {
            positions
                .get(&p.id)
                .map(|&(x, y, rank)| PlacedPerson { id: p.id, x, y, rank })
        })
        .collect();

    let edges: Vec<LayoutEdge> = rels
        .iter()
        .map(|rel| {
            let class = match rel.kind.lineage() {
                Some(lineage) => {
                    let paternal = graph
                        .person(rel.from)
                        .map(|p| p.gender == Some(Gender::Male))
                        .unwrap_or(false);
                    EdgeClass::ParentChild { lineage, paternal }
                }
                None => EdgeClass::Spouse,
            };
            LayoutEdge {
                id: rel.id,
                from: rel.from,
                to: rel.to,
                class,
            }
        })
        .collect();

    let width = 2.0 * MARGIN + widest;
    let height = 2.0 * MARGIN
        + (max_rank as f64 + 1.0) * NODE_HEIGHT
        + max_rank as f64 * RANK_SEP;

    TreeLayout {
        nodes,
        edges,
        width,
        height,
    }
}

/// Longest-path layering via Kahn's algorithm
///
/// `rank(child) = max(rank(parents)) + 1`. Nodes left over after the queue
/// drains sit on a cycle (corrupt data); they fall back to rank 0 instead
/// of stalling the layout.
fn assign_ranks(
    members: &[PersonId],
    succs: &FxHashMap<PersonId, Vec<PersonId>>,
    preds: &FxHashMap<PersonId, Vec<PersonId>>,
) -> FxHashMap<PersonId, u32> {
    let mut in_degree: FxHashMap<PersonId, usize> = FxHashMap::default();
    for id in members {
        in_degree.insert(*id, preds.get(id).map_or(0, Vec::len));
    }

    let mut ranks: FxHashMap<PersonId, u32> = FxHashMap::default();
    let mut queue: std::collections::VecDeque<PersonId> = members
        .iter()
        .copied()
        .filter(|id| in_degree[id] == 0)
        .collect();
    for id in &queue {
        ranks.insert(*id, 0);
    }

    while let Some(id) = queue.pop_front() {
        let rank = ranks[&id];
        for next in succs.get(&id).into_iter().flatten() {
            let entry = ranks.entry(*next).or_insert(0);
            *entry = (*entry).max(rank + 1);
            let deg = in_degree.get_mut(next).expect("member in-degree");
            *deg -= 1;
            if *deg == 0 {
                queue.push_back(*next);
            }
        }
    }

    for id in members {
        ranks.entry(*id).or_insert(0);
    }

    ranks
}

/// Two rounds of barycenter ordering: a downward sweep pulls each row
/// toward the mean position of its parents, an upward sweep toward its
/// children. Rows keep their previous order where no neighbor exists.
fn barycenter_sweeps(
    by_rank: &mut [Vec<PersonId>],
    succs: &FxHashMap<PersonId, Vec<PersonId>>,
    preds: &FxHashMap<PersonId, Vec<PersonId>>,
) {
    for _ in 0..2 {
        // Downward
        for r in 1..by_rank.len() {
            let above: FxHashMap<PersonId, f64> = by_rank[r - 1]
                .iter()
                .enumerate()
                .map(|(i, id)| (*id, i as f64))
                .collect();
            sort_row(&mut by_rank[r], preds, &above);
        }
        // Upward
        for r in (0..by_rank.len().saturating_sub(1)).rev() {
            let below: FxHashMap<PersonId, f64> = by_rank[r + 1]
                .iter()
                .enumerate()
                .map(|(i, id)| (*id, i as f64))
                .collect();
            sort_row(&mut by_rank[r], succs, &below);
        }
    }
}

fn sort_row(
    row: &mut [PersonId],
    neighbors: &FxHashMap<PersonId, Vec<PersonId>>,
    neighbor_pos: &FxHashMap<PersonId, f64>,
) {
    let current: FxHashMap<PersonId, f64> = row
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as f64))
        .collect();

    let barycenter = |id: PersonId| -> f64 {
        let list: Vec<f64> = neighbors
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|n| neighbor_pos.get(n).copied())
            .collect();
        if list.is_empty() {
            current[&id]
        } else {
            list.iter().sum::<f64>() / list.len() as f64
        }
    };

    row.sort_by(|a, b| {
        barycenter(*a)
            .partial_cmp(&barycenter(*b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
