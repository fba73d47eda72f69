//! In-memory family graph storage
//!
//! One `FamilyGraph` per family space. People and relationships live in
//! insertion-ordered maps; adjacency lists give O(1) access to a person's
//! incident edges for traversal and cascade deletes.

use super::person::{Person, PersonInput, PersonPatch};
use super::relationship::Relationship;
use super::types::{PersonId, RelationshipId, RelationshipKind};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of hits returned by a people search
const SEARCH_LIMIT: usize = 20;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Person {0} not found")]
    PersonNotFound(PersonId),

    #[error("Relationship {0} not found")]
    RelationshipNotFound(RelationshipId),

    #[error("Invalid relationship: source person {0} does not exist")]
    InvalidRelationshipSource(PersonId),

    #[error("Invalid relationship: target person {0} does not exist")]
    InvalidRelationshipTarget(PersonId),

    #[error("A person cannot be related to themselves")]
    SelfRelationship(PersonId),

    #[error("Relationship between {from} and {to} already exists")]
    DuplicateRelationship { from: PersonId, to: PersonId },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Fields accepted when creating a relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipInput {
    #[serde(flatten)]
    pub kind: RelationshipKind,
    pub from: PersonId,
    pub to: PersonId,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

impl RelationshipInput {
    pub fn new(from: PersonId, to: PersonId, kind: RelationshipKind) -> Self {
        Self {
            kind,
            from,
            to,
            start_year: None,
            end_year: None,
        }
    }
}

/// Serializable image of a graph, used by the snapshot store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub people: Vec<Person>,
    pub relationships: Vec<Relationship>,
    pub next_person_id: u64,
    pub next_relationship_id: u64,
}

/// In-memory family graph for one space
#[derive(Debug)]
pub struct FamilyGraph {
    /// People in insertion order
    people: IndexMap<PersonId, Person>,
    /// Relationships in insertion order
    relationships: IndexMap<RelationshipId, Relationship>,
    /// Edges leaving each person (parent side of parent-child edges)
    outgoing: FxHashMap<PersonId, Vec<RelationshipId>>,
    /// Edges entering each person
    incoming: FxHashMap<PersonId, Vec<RelationshipId>>,
    /// Next person id; ids are never reused
    next_person_id: u64,
    /// Next relationship id
    next_relationship_id: u64,
}

impl FamilyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        FamilyGraph {
            people: IndexMap::new(),
            relationships: IndexMap::new(),
            outgoing: FxHashMap::default(),
            incoming: FxHashMap::default(),
            next_person_id: 1,
            next_relationship_id: 1,
        }
    }

    /// Add a person, returning the assigned id
    pub fn add_person(&mut self, input: PersonInput) -> PersonId {
        let id = PersonId::new(self.next_person_id);
        self.next_person_id += 1;
        self.people.insert(id, Person::new(id, input));
        id
    }

    /// Look up a person
    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.people.get(&id)
    }

    /// Apply a partial update to a person
    pub fn update_person(&mut self, id: PersonId, patch: PersonPatch) -> GraphResult<&Person> {
        let person = self
            .people
            .get_mut(&id)
            .ok_or(GraphError::PersonNotFound(id))?;
        person.apply(patch);
        Ok(&self.people[&id])
    }

    /// Remove a person and every relationship touching them
    pub fn remove_person(&mut self, id: PersonId) -> GraphResult<Person> {
        let person = self
            .people
            .shift_remove(&id)
            .ok_or(GraphError::PersonNotFound(id))?;

        let mut incident: Vec<RelationshipId> = Vec::new();
        incident.extend(self.outgoing.remove(&id).unwrap_or_default());
        incident.extend(self.incoming.remove(&id).unwrap_or_default());

        for rel_id in incident {
            if let Some(rel) = self.relationships.shift_remove(&rel_id) {
                // Drop the edge from the other endpoint's adjacency too
                let other = if rel.from == id { rel.to } else { rel.from };
                if let Some(list) = self.outgoing.get_mut(&other) {
                    list.retain(|r| *r != rel_id);
                }
                if let Some(list) = self.incoming.get_mut(&other) {
                    list.retain(|r| *r != rel_id);
                }
            }
        }

        Ok(person)
    }

    /// Add a relationship after validating endpoints and duplicates
    pub fn add_relationship(&mut self, input: RelationshipInput) -> GraphResult<RelationshipId> {
        let RelationshipInput {
            kind,
            from,
            to,
            start_year,
            end_year,
        } = input;

        if !self.people.contains_key(&from) {
            return Err(GraphError::InvalidRelationshipSource(from));
        }
        if !self.people.contains_key(&to) {
            return Err(GraphError::InvalidRelationshipTarget(to));
        }
        if from == to {
            return Err(GraphError::SelfRelationship(from));
        }
        if self.is_duplicate(from, to, kind) {
            return Err(GraphError::DuplicateRelationship { from, to });
        }

        let id = RelationshipId::new(self.next_relationship_id);
        self.next_relationship_id += 1;

        let mut rel = Relationship::new(id, from, to, kind);
        rel.start_year = start_year;
        rel.end_year = end_year;

        self.outgoing.entry(from).or_default().push(id);
        self.incoming.entry(to).or_default().push(id);
        self.relationships.insert(id, rel);

        Ok(id)
    }

    /// Convenience wrapper for plain edges (seed data, tests)
    pub fn connect(
        &mut self,
        from: PersonId,
        to: PersonId,
        kind: RelationshipKind,
    ) -> GraphResult<RelationshipId> {
        self.add_relationship(RelationshipInput::new(from, to, kind))
    }

    /// Look up a relationship
    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.get(&id)
    }

    /// Remove a relationship
    pub fn remove_relationship(&mut self, id: RelationshipId) -> GraphResult<Relationship> {
        let rel = self
            .relationships
            .shift_remove(&id)
            .ok_or(GraphError::RelationshipNotFound(id))?;

        if let Some(list) = self.outgoing.get_mut(&rel.from) {
            list.retain(|r| *r != id);
        }
        if let Some(list) = self.incoming.get_mut(&rel.to) {
            list.retain(|r| *r != id);
        }

        Ok(rel)
    }

    /// Parents of a person (sources of incoming parent-child edges)
    pub fn parents_of(&self, id: PersonId) -> Vec<PersonId> {
        self.incoming
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|rel_id| self.relationships.get(rel_id))
            .filter(|rel| rel.kind.is_parent_child())
            .map(|rel| rel.from)
            .collect()
    }

    /// Children of a person (targets of outgoing parent-child edges)
    pub fn children_of(&self, id: PersonId) -> Vec<PersonId> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|rel_id| self.relationships.get(rel_id))
            .filter(|rel| rel.kind.is_parent_child())
            .map(|rel| rel.to)
            .collect()
    }

    /// Spouses of a person, regardless of stored edge direction
    pub fn spouses_of(&self, id: PersonId) -> Vec<PersonId> {
        self.relationships_of(id)
            .into_iter()
            .filter(|rel| rel.kind.is_spouse())
            .filter_map(|rel| rel.other(id))
            .collect()
    }

    /// Every relationship touching a person
    pub fn relationships_of(&self, id: PersonId) -> Vec<&Relationship> {
        let mut out: Vec<&Relationship> = Vec::new();
        for list in [self.outgoing.get(&id), self.incoming.get(&id)]
            .into_iter()
            .flatten()
        {
            for rel_id in list {
                if let Some(rel) = self.relationships.get(rel_id) {
                    out.push(rel);
                }
            }
        }
        out
    }

    /// Iterate people in insertion order
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    /// Iterate relationships in insertion order
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn contains_person(&self, id: PersonId) -> bool {
        self.people.contains_key(&id)
    }

    /// Case-insensitive substring search over names and nickname
    pub fn search(&self, query: &str) -> Vec<&Person> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        self.people
            .values()
            .filter(|p| p.matches(query))
            .take(SEARCH_LIMIT)
            .collect()
    }

    /// Serializable image of this graph
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            people: self.people.values().cloned().collect(),
            relationships: self.relationships.values().cloned().collect(),
            next_person_id: self.next_person_id,
            next_relationship_id: self.next_relationship_id,
        }
    }

    /// Rebuild a graph, including adjacency indexes, from a snapshot
    pub fn restore(snapshot: GraphSnapshot) -> Self {
        let mut graph = FamilyGraph::new();
        graph.next_person_id = snapshot.next_person_id;
        graph.next_relationship_id = snapshot.next_relationship_id;

        for person in snapshot.people {
            graph.people.insert(person.id, person);
        }
        for rel in snapshot.relationships {
            graph.outgoing.entry(rel.from).or_default().push(rel.id);
            graph.incoming.entry(rel.to).or_default().push(rel.id);
            graph.relationships.insert(rel.id, rel);
        }

        graph
    }

    fn is_duplicate(&self, from: PersonId, to: PersonId, kind: RelationshipKind) -> bool {
        match kind {
            // Same (parent, child) pair, any lineage
            RelationshipKind::ParentChild(_) => self
                .outgoing
                .get(&from)
                .into_iter()
                .flatten()
                .filter_map(|rel_id| self.relationships.get(rel_id))
                .any(|rel| rel.kind.is_parent_child() && rel.to == to),
            // Spouse edges are symmetric, check both directions
            RelationshipKind::Spouse(_) => self
                .relationships_of(from)
                .into_iter()
                .any(|rel| rel.kind.is_spouse() && rel.connects(from, to)),
        }
    }
}

impl Default for FamilyGraph {
    fn default() -> Self {
        Self::new()
    }
}
