//! Snapshot persistence across manager restarts

use kinship::graph::{Lineage, PersonInput, RelationshipInput, RelationshipKind};
use kinship::persistence::SnapshotStore;
use kinship::space::{Role, SpaceManager};
use tempfile::TempDir;

fn input(first: &str) -> PersonInput {
    PersonInput {
        first_name: first.to_string(),
        last_name: "Persist".to_string(),
        ..Default::default()
    }
}

#[test]
fn spaces_survive_restart() {
    let dir = TempDir::new().unwrap();

    let (space_id, owner_id, parent_id, child_id) = {
        let store = SnapshotStore::open(dir.path()).unwrap();
        let manager = SpaceManager::with_snapshots(store).unwrap();

        let owner = manager.register_user("owner@persist.test", "Owner").unwrap();
        let space = manager.create_space(&owner.id, "Persist Family", None).unwrap();
        let parent = manager.create_person(&space.id, &owner.id, input("Parent")).unwrap();
        let child = manager.create_person(&space.id, &owner.id, input("Child")).unwrap();
        manager
            .create_relationship(
                &space.id,
                &owner.id,
                RelationshipInput::new(
                    parent.id,
                    child.id,
                    RelationshipKind::ParentChild(Lineage::Biological),
                ),
            )
            .unwrap();

        (space.id, owner.id, parent.id, child.id)
    };

    // Fresh manager over the same directory
    let store = SnapshotStore::open(dir.path()).unwrap();
    let manager = SpaceManager::with_snapshots(store).unwrap();

    let overview = manager.overview(&space_id, Some(&owner_id)).unwrap();
    assert_eq!(overview.person_count, 2);
    assert_eq!(overview.members.len(), 1);

    let view = manager
        .tree_view(&space_id, Some(&owner_id), None, Default::default(), 3)
        .unwrap();
    assert!(view
        .layout
        .edges
        .iter()
        .any(|e| e.from == parent_id && e.to == child_id));

    // Id counters survive: a new person never collides with a loaded one
    let another = manager
        .create_person(&space_id, &owner_id, input("Another"))
        .unwrap();
    assert!(another.id > child_id);
}

#[test]
fn claims_and_links_survive_restart() {
    let dir = TempDir::new().unwrap();

    let (space_id, claimer_id, person_id) = {
        let manager =
            SpaceManager::with_snapshots(SnapshotStore::open(dir.path()).unwrap()).unwrap();
        let owner = manager.register_user("owner@persist.test", "Owner").unwrap();
        let space = manager.create_space(&owner.id, "Persist Family", None).unwrap();
        let person = manager.create_person(&space.id, &owner.id, input("Me")).unwrap();

        let claimer = manager.register_user("me@persist.test", "Me").unwrap();
        let claim = manager.submit_claim(&space.id, &claimer.id, person.id).unwrap();
        manager.approve_claim(&space.id, &owner.id, claim.id).unwrap();

        (space.id, claimer.id, person.id)
    };

    let manager = SpaceManager::with_snapshots(SnapshotStore::open(dir.path()).unwrap()).unwrap();

    assert_eq!(
        manager.claimed_person(&space_id, &claimer_id).unwrap(),
        Some(person_id)
    );

    // Branch rights still apply after the reload
    manager
        .update_person(
            &space_id,
            &claimer_id,
            person_id,
            kinship::PersonPatch::default(),
        )
        .unwrap();
}

#[test]
fn invitations_survive_restart() {
    let dir = TempDir::new().unwrap();

    let (space_id, token) = {
        let manager =
            SpaceManager::with_snapshots(SnapshotStore::open(dir.path()).unwrap()).unwrap();
        let owner = manager.register_user("owner@persist.test", "Owner").unwrap();
        let space = manager.create_space(&owner.id, "Persist Family", None).unwrap();
        let invite = manager
            .create_invitation(&space.id, &owner.id, Role::Editor)
            .unwrap();
        (space.id, invite.token)
    };

    let manager = SpaceManager::with_snapshots(SnapshotStore::open(dir.path()).unwrap()).unwrap();

    // The token index is rebuilt at load, so redemption still works
    let guest = manager.register_user("guest@persist.test", "Guest").unwrap();
    let joined = manager.accept_invitation(&guest.id, &token).unwrap();
    assert_eq!(joined, space_id);

    // And the used flag persists too
    let other = manager.register_user("other@persist.test", "Other").unwrap();
    assert!(manager.accept_invitation(&other.id, &token).is_err());
}

#[test]
fn users_survive_restart() {
    let dir = TempDir::new().unwrap();

    {
        let manager =
            SpaceManager::with_snapshots(SnapshotStore::open(dir.path()).unwrap()).unwrap();
        manager.register_user("a@persist.test", "A").unwrap();
        manager.register_user("b@persist.test", "B").unwrap();
    }

    let manager = SpaceManager::with_snapshots(SnapshotStore::open(dir.path()).unwrap()).unwrap();
    let (_, users, _, _) = manager.counts();
    assert_eq!(users, 2);

    // The e-mail index is rebuilt, so duplicates are still caught
    assert!(manager.register_user("a@persist.test", "A2").is_err());
    assert!(manager.user_by_email(" A@Persist.Test ").is_some());
}
