//! Family spaces: tenancy, memberships, claims, invitations
//!
//! A space is the tenant boundary around one family's graph. The
//! [`SpaceManager`] owns every space and the user directory behind
//! `RwLock`ed registries, enforces role- and branch-based authorization,
//! and writes a snapshot after each successful mutation when a snapshot
//! store is attached.

pub mod claim;
pub mod invite;
pub mod role;
pub mod user;

pub use claim::{ClaimId, ClaimRequest, ClaimStatus};
pub use invite::{Invitation, INVITATION_TTL_MILLIS};
pub use role::{EffectiveRole, Role};
pub use user::{User, UserId};

use crate::algo::{branch, visibility};
use crate::algo::visibility::TreeMode;
use crate::graph::{
    now_millis, FamilyGraph, GraphError, GraphSnapshot, Person, PersonId, PersonInput,
    PersonPatch, Relationship, RelationshipId, RelationshipInput,
};
use crate::layout::{self, TreeLayout};
use crate::persistence::{SnapshotError, SnapshotStore};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Unique identifier for a family space
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SpaceId(pub String);

impl SpaceId {
    pub fn generate() -> Self {
        SpaceId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SpaceId {
    fn from(s: &str) -> Self {
        SpaceId(s.to_string())
    }
}

/// Space errors
#[derive(Error, Debug)]
pub enum SpaceError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Space not found: {0}")]
    SpaceNotFound(SpaceId),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Not a member of space {0}")]
    NotAMember(SpaceId),

    #[error("Requires at least {required} in space {space}")]
    InsufficientRole { space: SpaceId, required: Role },

    #[error("No edit permission in space {0}")]
    NoEditPermission(SpaceId),

    #[error("Can only edit your own branch")]
    OutsideBranch,

    #[error("Quota exceeded for space {space}: {resource}")]
    QuotaExceeded { space: SpaceId, resource: String },

    #[error("Claim {0} not found")]
    ClaimNotFound(ClaimId),

    #[error("Claim {0} has already been processed")]
    ClaimNotPending(ClaimId),

    #[error("A claim for this person already exists")]
    DuplicateClaim,

    #[error("This person has already been claimed")]
    PersonAlreadyClaimed,

    #[error("User is already linked to a person in this space")]
    UserAlreadyLinked,

    #[error("Invalid or expired invitation")]
    InvitationInvalid,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

pub type SpaceResult<T> = Result<T, SpaceError>;

/// Per-space resource caps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceQuotas {
    pub max_people: Option<usize>,
    pub max_relationships: Option<usize>,
    pub max_members: Option<usize>,
}

impl Default for SpaceQuotas {
    fn default() -> Self {
        Self {
            max_people: Some(10_000),
            max_relationships: Some(50_000),
            max_members: Some(500),
        }
    }
}

impl SpaceQuotas {
    /// No caps at all
    pub fn unlimited() -> Self {
        Self {
            max_people: None,
            max_relationships: None,
            max_members: None,
        }
    }
}

/// Space metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilySpace {
    pub id: SpaceId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

/// A user's membership in a space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: UserId,
    pub role: Role,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

/// One space plus the caller's role, for space listings
#[derive(Debug, Clone, Serialize)]
pub struct SpaceSummary {
    #[serde(flatten)]
    pub space: FamilySpace,
    pub role: Role,
    pub person_count: usize,
    pub member_count: usize,
}

/// Member entry for listings; e-mail full for owners, masked otherwise
#[derive(Debug, Clone, Serialize)]
pub struct MemberInfo {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub effective_role: EffectiveRole,
}

/// Public space read: meta, people and members
#[derive(Debug, Clone, Serialize)]
pub struct SpaceOverview {
    #[serde(flatten)]
    pub space: FamilySpace,
    pub person_count: usize,
    pub member_count: usize,
    pub pending_claim_count: usize,
    pub people: Vec<Person>,
    pub members: Vec<MemberInfo>,
}

/// Pending claim joined with claimant and person display data
#[derive(Debug, Clone, Serialize)]
pub struct ClaimInfo {
    pub id: ClaimId,
    pub status: ClaimStatus,
    pub created_at: i64,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub person_id: PersonId,
    pub person_name: String,
    pub person_name_alt: Option<String>,
}

/// Server-computed tree view: visible people plus their placement
#[derive(Debug, Clone, Serialize)]
pub struct TreeView {
    pub people: Vec<Person>,
    #[serde(flatten)]
    pub layout: TreeLayout,
}

/// Serializable image of one space, used by the snapshot store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceSnapshot {
    pub space: FamilySpace,
    pub quotas: SpaceQuotas,
    pub graph: GraphSnapshot,
    pub memberships: Vec<Membership>,
    pub claims: Vec<ClaimRequest>,
    pub next_claim_id: u64,
    /// Approved claim links, user to person
    pub links: Vec<(UserId, PersonId)>,
    pub invitations: Vec<Invitation>,
}

/// Everything owned by one space
struct SpaceState {
    space: FamilySpace,
    quotas: SpaceQuotas,
    graph: FamilyGraph,
    memberships: IndexMap<UserId, Membership>,
    claims: IndexMap<ClaimId, ClaimRequest>,
    next_claim_id: u64,
    /// Approved claim link, person side
    claimed_by: FxHashMap<PersonId, UserId>,
    /// Approved claim link, user side
    link_of: HashMap<UserId, PersonId>,
    /// Invitations by token
    invitations: IndexMap<String, Invitation>,
}

impl SpaceState {
    fn new(space: FamilySpace, quotas: SpaceQuotas) -> Self {
        SpaceState {
            space,
            quotas,
            graph: FamilyGraph::new(),
            memberships: IndexMap::new(),
            claims: IndexMap::new(),
            next_claim_id: 1,
            claimed_by: FxHashMap::default(),
            link_of: HashMap::new(),
            invitations: IndexMap::new(),
        }
    }

    fn snapshot(&self) -> SpaceSnapshot {
        SpaceSnapshot {
            space: self.space.clone(),
            quotas: self.quotas.clone(),
            graph: self.graph.snapshot(),
            memberships: self.memberships.values().cloned().collect(),
            claims: self.claims.values().cloned().collect(),
            next_claim_id: self.next_claim_id,
            links: self
                .link_of
                .iter()
                .map(|(u, p)| (u.clone(), *p))
                .collect(),
            invitations: self.invitations.values().cloned().collect(),
        }
    }

    fn restore(snapshot: SpaceSnapshot) -> Self {
        let mut state = SpaceState::new(snapshot.space, snapshot.quotas);
        state.graph = FamilyGraph::restore(snapshot.graph);
        state.next_claim_id = snapshot.next_claim_id;
        for membership in snapshot.memberships {
            state
                .memberships
                .insert(membership.user_id.clone(), membership);
        }
        for claim in snapshot.claims {
            state.claims.insert(claim.id, claim);
        }
        for (user, person) in snapshot.links {
            state.claimed_by.insert(person, user.clone());
            state.link_of.insert(user, person);
        }
        for invitation in snapshot.invitations {
            state.invitations.insert(invitation.token.clone(), invitation);
        }
        state
    }

    fn role_of(&self, user: &UserId) -> Option<Role> {
        self.memberships.get(user).map(|m| m.role)
    }

    fn effective_role(&self, user: &UserId) -> Option<EffectiveRole> {
        let role = self.role_of(user);
        match role {
            Some(r) if r >= Role::Editor => Some(r.into()),
            _ if self.link_of.contains_key(user) => Some(EffectiveRole::Claimer),
            Some(r) => Some(r.into()),
            None => None,
        }
    }

    fn require_role(&self, user: &UserId, required: Role) -> SpaceResult<&Membership> {
        let membership = self
            .memberships
            .get(user)
            .ok_or_else(|| SpaceError::NotAMember(self.space.id.clone()))?;
        if membership.role < required {
            return Err(SpaceError::InsufficientRole {
                space: self.space.id.clone(),
                required,
            });
        }
        Ok(membership)
    }

    /// OWNER/EDITOR edit anyone; a linked claimer edits their own branch
    fn check_edit_permission(&self, user: &UserId, target: PersonId) -> SpaceResult<()> {
        if let Some(role) = self.role_of(user) {
            if role >= Role::Editor {
                return Ok(());
            }
        }

        let claimed = self
            .link_of
            .get(user)
            .ok_or_else(|| SpaceError::NoEditPermission(self.space.id.clone()))?;

        if branch(&self.graph, *claimed).contains(&target) {
            Ok(())
        } else {
            Err(SpaceError::OutsideBranch)
        }
    }

    /// Creating a person needs EDITOR, or any claim link
    fn check_create_permission(&self, user: &UserId) -> SpaceResult<()> {
        if let Some(role) = self.role_of(user) {
            if role >= Role::Editor {
                return Ok(());
            }
        }
        if self.link_of.contains_key(user) {
            return Ok(());
        }
        Err(SpaceError::NoEditPermission(self.space.id.clone()))
    }

    fn check_quota(&self, resource: &str) -> SpaceResult<()> {
        let (current, max) = match resource {
            "people" => (self.graph.person_count(), self.quotas.max_people),
            "relationships" => (
                self.graph.relationship_count(),
                self.quotas.max_relationships,
            ),
            "members" => (self.memberships.len(), self.quotas.max_members),
            _ => return Ok(()),
        };
        if let Some(max) = max {
            if current >= max {
                return Err(SpaceError::QuotaExceeded {
                    space: self.space.id.clone(),
                    resource: format!("{resource} ({current}/{max})"),
                });
            }
        }
        Ok(())
    }

    fn is_member(&self, user: Option<&UserId>) -> bool {
        user.map(|u| self.memberships.contains_key(u)).unwrap_or(false)
    }

    /// People as stored for members, redacted otherwise
    fn people_for(&self, member: bool) -> Vec<Person> {
        self.graph
            .people()
            .map(|p| if member { p.clone() } else { p.redacted() })
            .collect()
    }

    fn member_infos(&self, users: &HashMap<UserId, User>, full_email: bool) -> Vec<MemberInfo> {
        self.memberships
            .values()
            .filter_map(|m| {
                users.get(&m.user_id).map(|user| MemberInfo {
                    user_id: user.id.clone(),
                    name: user.name.clone(),
                    email: if full_email {
                        user.email.clone()
                    } else {
                        user.masked_email()
                    },
                    role: m.role,
                    effective_role: self
                        .effective_role(&m.user_id)
                        .unwrap_or_else(|| m.role.into()),
                })
            })
            .collect()
    }
}

/// Registry of users and family spaces
pub struct SpaceManager {
    users: RwLock<HashMap<UserId, User>>,
    /// Normalized e-mail to user id
    email_index: RwLock<HashMap<String, UserId>>,
    spaces: RwLock<HashMap<SpaceId, SpaceState>>,
    /// Invitation token to owning space
    token_index: RwLock<HashMap<String, SpaceId>>,
    snapshots: Option<SnapshotStore>,
}

impl SpaceManager {
    /// Create an in-memory manager
    pub fn new() -> Self {
        SpaceManager {
            users: RwLock::new(HashMap::new()),
            email_index: RwLock::new(HashMap::new()),
            spaces: RwLock::new(HashMap::new()),
            token_index: RwLock::new(HashMap::new()),
            snapshots: None,
        }
    }

    /// Create a manager backed by a snapshot store, loading existing data
    pub fn with_snapshots(store: SnapshotStore) -> SpaceResult<Self> {
        let mut manager = SpaceManager::new();

        let users = store.load_users()?;
        {
            let mut user_map = manager.users.write().unwrap();
            let mut email_index = manager.email_index.write().unwrap();
            for user in users {
                email_index.insert(user.email.clone(), user.id.clone());
                user_map.insert(user.id.clone(), user);
            }
        }

        let snapshots = store.load_spaces()?;
        {
            let mut spaces = manager.spaces.write().unwrap();
            let mut token_index = manager.token_index.write().unwrap();
            for snapshot in snapshots {
                let state = SpaceState::restore(snapshot);
                for token in state.invitations.keys() {
                    token_index.insert(token.clone(), state.space.id.clone());
                }
                spaces.insert(state.space.id.clone(), state);
            }
            info!("Loaded {} spaces from snapshots", spaces.len());
        }

        manager.snapshots = Some(store);
        Ok(manager)
    }

    fn persist_space(&self, state: &SpaceState) -> SpaceResult<()> {
        if let Some(store) = &self.snapshots {
            store.save_space(&state.snapshot())?;
        }
        Ok(())
    }

    fn persist_users(&self, users: &HashMap<UserId, User>) -> SpaceResult<()> {
        if let Some(store) = &self.snapshots {
            let list: Vec<User> = users.values().cloned().collect();
            store.save_users(&list)?;
        }
        Ok(())
    }

    // ---- users ----

    /// Register a directory entry; the normalized e-mail must be unused
    pub fn register_user(&self, email: &str, name: &str) -> SpaceResult<User> {
        let user = User::new(email, name);

        let mut users = self.users.write().unwrap();
        let mut email_index = self.email_index.write().unwrap();
        if email_index.contains_key(&user.email) {
            return Err(SpaceError::EmailTaken(user.email));
        }
        email_index.insert(user.email.clone(), user.id.clone());
        users.insert(user.id.clone(), user.clone());

        info!("Registered user {} ({})", user.name, user.id);
        self.persist_users(&users)?;
        Ok(user)
    }

    /// Look up a user
    pub fn user(&self, id: &UserId) -> Option<User> {
        self.users.read().unwrap().get(id).cloned()
    }

    /// Look up a user by normalized e-mail
    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let normalized = user::normalize_email(email);
        let id = self.email_index.read().unwrap().get(&normalized).cloned()?;
        self.users.read().unwrap().get(&id).cloned()
    }

    fn require_user(&self, id: &UserId) -> SpaceResult<User> {
        self.user(id).ok_or_else(|| SpaceError::UserNotFound(id.clone()))
    }

    // ---- spaces ----

    /// Create a space; the creator becomes OWNER
    pub fn create_space(
        &self,
        user: &UserId,
        name: &str,
        description: Option<String>,
    ) -> SpaceResult<FamilySpace> {
        self.require_user(user)?;

        let space = FamilySpace {
            id: SpaceId::generate(),
            name: name.to_string(),
            description,
            created_at: now_millis(),
        };
        let mut state = SpaceState::new(space.clone(), SpaceQuotas::default());
        state.memberships.insert(
            user.clone(),
            Membership {
                user_id: user.clone(),
                role: Role::Owner,
                created_at: now_millis(),
            },
        );

        let mut spaces = self.spaces.write().unwrap();
        self.persist_space(&state)?;
        spaces.insert(space.id.clone(), state);

        info!("Created space {} ({})", space.name, space.id);
        Ok(space)
    }

    /// Spaces the user belongs to, most recently joined first
    pub fn spaces_for_user(&self, user: &UserId) -> SpaceResult<Vec<SpaceSummary>> {
        self.require_user(user)?;

        let spaces = self.spaces.read().unwrap();
        let mut summaries: Vec<(i64, SpaceSummary)> = spaces
            .values()
            .filter_map(|state| {
                state.memberships.get(user).map(|m| {
                    (
                        m.created_at,
                        SpaceSummary {
                            space: state.space.clone(),
                            role: m.role,
                            person_count: state.graph.person_count(),
                            member_count: state.memberships.len(),
                        },
                    )
                })
            })
            .collect();
        summaries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(summaries.into_iter().map(|(_, s)| s).collect())
    }

    /// Public space read; people are redacted for non-members
    pub fn overview(&self, space: &SpaceId, caller: Option<&UserId>) -> SpaceResult<SpaceOverview> {
        let spaces = self.spaces.read().unwrap();
        let state = spaces
            .get(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;

        let users = self.users.read().unwrap();
        let member = state.is_member(caller);
        Ok(SpaceOverview {
            space: state.space.clone(),
            person_count: state.graph.person_count(),
            member_count: state.memberships.len(),
            pending_claim_count: state.claims.values().filter(|c| c.is_pending()).count(),
            people: state.people_for(member),
            members: state.member_infos(&users, false),
        })
    }

    /// Member listing; full e-mail addresses for owners only
    pub fn members(&self, space: &SpaceId, caller: &UserId) -> SpaceResult<Vec<MemberInfo>> {
        let spaces = self.spaces.read().unwrap();
        let state = spaces
            .get(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;
        let membership = state.require_role(caller, Role::Viewer)?;

        let users = self.users.read().unwrap();
        Ok(state.member_infos(&users, membership.role == Role::Owner))
    }

    /// The caller's effective role in a space, if any
    pub fn effective_role(&self, space: &SpaceId, user: &UserId) -> SpaceResult<Option<EffectiveRole>> {
        let spaces = self.spaces.read().unwrap();
        let state = spaces
            .get(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;
        Ok(state.effective_role(user))
    }

    /// Replace a space's quotas (OWNER only)
    pub fn update_quotas(
        &self,
        space: &SpaceId,
        caller: &UserId,
        quotas: SpaceQuotas,
    ) -> SpaceResult<()> {
        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;
        state.require_role(caller, Role::Owner)?;
        state.quotas = quotas;
        info!("Updated quotas for space {}", space);
        self.persist_space(state)
    }

    // ---- people ----

    /// Add a person (EDITOR, or any claim link)
    pub fn create_person(
        &self,
        space: &SpaceId,
        caller: &UserId,
        input: PersonInput,
    ) -> SpaceResult<Person> {
        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;

        state.check_create_permission(caller)?;
        state.check_quota("people")?;

        let id = state.graph.add_person(input);
        debug!("Created person {} in space {}", id, space);
        let person = state.graph.person(id).cloned().expect("person just added");
        self.persist_space(state)?;
        Ok(person)
    }

    /// Update a person (EDITOR, or claimer within branch)
    pub fn update_person(
        &self,
        space: &SpaceId,
        caller: &UserId,
        person: PersonId,
        patch: PersonPatch,
    ) -> SpaceResult<Person> {
        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;

        if !state.graph.contains_person(person) {
            return Err(GraphError::PersonNotFound(person).into());
        }
        state.check_edit_permission(caller, person)?;

        let updated = state.graph.update_person(person, patch)?.clone();
        self.persist_space(state)?;
        Ok(updated)
    }

    /// Delete a person and everything hanging off them
    pub fn delete_person(
        &self,
        space: &SpaceId,
        caller: &UserId,
        person: PersonId,
    ) -> SpaceResult<()> {
        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;

        if !state.graph.contains_person(person) {
            return Err(GraphError::PersonNotFound(person).into());
        }
        state.check_edit_permission(caller, person)?;

        state.graph.remove_person(person)?;

        // Claims and links referencing the person go with them
        state.claims.retain(|_, c| c.person_id != person);
        if let Some(user) = state.claimed_by.remove(&person) {
            state.link_of.remove(&user);
        }

        info!("Deleted person {} from space {}", person, space);
        self.persist_space(state)
    }

    // ---- relationships ----

    /// Add a relationship; authorization targets the `from` endpoint
    pub fn create_relationship(
        &self,
        space: &SpaceId,
        caller: &UserId,
        input: RelationshipInput,
    ) -> SpaceResult<Relationship> {
        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;

        state.check_edit_permission(caller, input.from)?;
        state.check_quota("relationships")?;

        let id = state.graph.add_relationship(input)?;
        let rel = state
            .graph
            .relationship(id)
            .cloned()
            .expect("relationship just added");
        debug!("Created relationship {} in space {}", id, space);
        self.persist_space(state)?;
        Ok(rel)
    }

    /// Remove a relationship; authorization targets its `from` endpoint
    pub fn delete_relationship(
        &self,
        space: &SpaceId,
        caller: &UserId,
        rel_id: RelationshipId,
    ) -> SpaceResult<()> {
        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;

        let from = state
            .graph
            .relationship(rel_id)
            .ok_or(GraphError::RelationshipNotFound(rel_id))?
            .from;
        state.check_edit_permission(caller, from)?;

        state.graph.remove_relationship(rel_id)?;
        self.persist_space(state)
    }

    // ---- tree and search ----

    /// Compute a tree view; people are redacted for non-members
    pub fn tree_view(
        &self,
        space: &SpaceId,
        caller: Option<&UserId>,
        focus: Option<PersonId>,
        mode: TreeMode,
        generations: u32,
    ) -> SpaceResult<TreeView> {
        let spaces = self.spaces.read().unwrap();
        let state = spaces
            .get(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;

        let tree = visibility::visible_tree(&state.graph, focus, mode, generations);
        let layout = layout::layout(&state.graph, &tree, mode);

        let member = state.is_member(caller);
        let people = tree
            .people
            .iter()
            .filter_map(|vp| state.graph.person(vp.id))
            .map(|p| if member { p.clone() } else { p.redacted() })
            .collect();

        Ok(TreeView { people, layout })
    }

    /// Search people; results are redacted for non-members
    pub fn search(
        &self,
        space: &SpaceId,
        caller: Option<&UserId>,
        query: &str,
    ) -> SpaceResult<Vec<Person>> {
        let spaces = self.spaces.read().unwrap();
        let state = spaces
            .get(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;

        let member = state.is_member(caller);
        Ok(state
            .graph
            .search(query)
            .into_iter()
            .map(|p| if member { p.clone() } else { p.redacted() })
            .collect())
    }

    // ---- invitations ----

    /// Create a single-use invitation (OWNER only)
    pub fn create_invitation(
        &self,
        space: &SpaceId,
        caller: &UserId,
        role: Role,
    ) -> SpaceResult<Invitation> {
        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;
        state.require_role(caller, Role::Owner)?;

        let invitation = Invitation::new(role);
        state
            .invitations
            .insert(invitation.token.clone(), invitation.clone());
        self.token_index
            .write()
            .unwrap()
            .insert(invitation.token.clone(), space.clone());

        info!("Created {} invitation for space {}", role, space);
        self.persist_space(state)?;
        Ok(invitation)
    }

    /// Redeem an invitation token, joining its space
    pub fn accept_invitation(&self, user: &UserId, token: &str) -> SpaceResult<SpaceId> {
        self.require_user(user)?;

        let space_id = self
            .token_index
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(SpaceError::InvitationInvalid)?;

        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(&space_id)
            .ok_or(SpaceError::InvitationInvalid)?;

        let now = now_millis();
        let role = {
            let invitation = state
                .invitations
                .get(token)
                .ok_or(SpaceError::InvitationInvalid)?;
            if !invitation.is_valid(now) {
                return Err(SpaceError::InvitationInvalid);
            }
            invitation.role
        };

        // Existing membership wins over the invitation's role
        if !state.memberships.contains_key(user) {
            state.check_quota("members")?;
            state.memberships.insert(
                user.clone(),
                Membership {
                    user_id: user.clone(),
                    role,
                    created_at: now,
                },
            );
            info!("User {} joined space {} as {}", user, space_id, role);
        }

        if let Some(invitation) = state.invitations.get_mut(token) {
            invitation.used = true;
        }

        self.persist_space(state)?;
        Ok(space_id)
    }

    // ---- claims ----

    /// Submit a claim for a person
    pub fn submit_claim(
        &self,
        space: &SpaceId,
        caller: &UserId,
        person: PersonId,
    ) -> SpaceResult<ClaimRequest> {
        self.require_user(caller)?;

        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;

        if !state.graph.contains_person(person) {
            return Err(GraphError::PersonNotFound(person).into());
        }
        if state
            .claims
            .values()
            .any(|c| c.user_id == *caller && c.person_id == person)
        {
            return Err(SpaceError::DuplicateClaim);
        }
        if state.claimed_by.contains_key(&person) {
            return Err(SpaceError::PersonAlreadyClaimed);
        }

        let id = ClaimId::new(state.next_claim_id);
        state.next_claim_id += 1;
        let claim = ClaimRequest::new(id, caller.clone(), person);
        state.claims.insert(id, claim.clone());

        info!("User {} claimed person {} in space {}", caller, person, space);
        self.persist_space(state)?;
        Ok(claim)
    }

    /// Pending claims with display data (OWNER only), newest first
    pub fn pending_claims(&self, space: &SpaceId, caller: &UserId) -> SpaceResult<Vec<ClaimInfo>> {
        let spaces = self.spaces.read().unwrap();
        let state = spaces
            .get(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;
        state.require_role(caller, Role::Owner)?;

        let users = self.users.read().unwrap();
        Ok(state
            .claims
            .values()
            .rev()
            .filter(|c| c.is_pending())
            .map(|c| {
                let user = users.get(&c.user_id);
                let person = state.graph.person(c.person_id);
                ClaimInfo {
                    id: c.id,
                    status: c.status,
                    created_at: c.created_at,
                    user_id: c.user_id.clone(),
                    user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
                    user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    person_id: c.person_id,
                    person_name: person.map(|p| p.full_name()).unwrap_or_default(),
                    person_name_alt: person.and_then(|p| p.alt_name()),
                }
            })
            .collect())
    }

    /// Approve a pending claim, establishing the user-person link
    pub fn approve_claim(
        &self,
        space: &SpaceId,
        caller: &UserId,
        claim_id: ClaimId,
    ) -> SpaceResult<()> {
        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;
        state.require_role(caller, Role::Owner)?;

        let (user_id, person_id) = {
            let claim = state
                .claims
                .get(&claim_id)
                .ok_or(SpaceError::ClaimNotFound(claim_id))?;
            if !claim.is_pending() {
                return Err(SpaceError::ClaimNotPending(claim_id));
            }
            (claim.user_id.clone(), claim.person_id)
        };

        // The person may have been claimed since submission
        if state.claimed_by.contains_key(&person_id) {
            return Err(SpaceError::PersonAlreadyClaimed);
        }
        if state.link_of.contains_key(&user_id) {
            return Err(SpaceError::UserAlreadyLinked);
        }

        state.claimed_by.insert(person_id, user_id.clone());
        state.link_of.insert(user_id.clone(), person_id);
        if let Some(claim) = state.claims.get_mut(&claim_id) {
            claim.status = ClaimStatus::Approved;
        }

        info!(
            "Approved claim {} linking user {} to person {} in space {}",
            claim_id, user_id, person_id, space
        );
        self.persist_space(state)
    }

    /// Reject a pending claim
    pub fn reject_claim(
        &self,
        space: &SpaceId,
        caller: &UserId,
        claim_id: ClaimId,
    ) -> SpaceResult<()> {
        let mut spaces = self.spaces.write().unwrap();
        let state = spaces
            .get_mut(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;
        state.require_role(caller, Role::Owner)?;

        let claim = state
            .claims
            .get_mut(&claim_id)
            .ok_or(SpaceError::ClaimNotFound(claim_id))?;
        if !claim.is_pending() {
            return Err(SpaceError::ClaimNotPending(claim_id));
        }
        claim.status = ClaimStatus::Rejected;

        info!("Rejected claim {} in space {}", claim_id, space);
        self.persist_space(state)
    }

    /// The person a user is linked to in a space, if any
    pub fn claimed_person(&self, space: &SpaceId, user: &UserId) -> SpaceResult<Option<PersonId>> {
        let spaces = self.spaces.read().unwrap();
        let state = spaces
            .get(space)
            .ok_or_else(|| SpaceError::SpaceNotFound(space.clone()))?;
        Ok(state.link_of.get(user).copied())
    }

    // ---- status ----

    /// Aggregate counts for the status endpoint
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let users = self.users.read().unwrap().len();
        let spaces = self.spaces.read().unwrap();
        let people = spaces.values().map(|s| s.graph.person_count()).sum();
        let relationships = spaces
            .values()
            .map(|s| s.graph.relationship_count())
            .sum();
        (spaces.len(), users, people, relationships)
    }
}

impl Default for SpaceManager {
    fn default() -> Self {
        Self::new()
    }
}
