//! Demo seed data
//!
//! Builds a three-generation bilingual demo family: grandparents, parents
//! and two children, wired with spouse and biological parent-child edges
//! under an admin-owned space.

use crate::graph::{Gender, Lineage, PersonInput, RelationshipInput, RelationshipKind, SpouseKind};
use crate::space::{SpaceId, SpaceManager, SpaceResult, UserId};
use tracing::info;

/// Seed a demo space; returns the admin user and space ids
pub fn seed_demo_space(manager: &SpaceManager) -> SpaceResult<(UserId, SpaceId)> {
    let admin = manager.register_user("admin@aoudi.family", "Admin")?;
    let space = manager.create_space(
        &admin.id,
        "Aoudi Family",
        Some("عائلة العودي".to_string()),
    )?;

    let person = |first: &str, last: &str, first_alt: &str, last_alt: &str, gender: Gender| {
        PersonInput {
            first_name: first.to_string(),
            last_name: last.to_string(),
            first_name_alt: Some(first_alt.to_string()),
            last_name_alt: Some(last_alt.to_string()),
            gender: Some(gender),
            ..Default::default()
        }
    };

    // Generation 1
    let mut grandfather = person("Ahmad", "Aoudi", "أحمد", "العودي", Gender::Male);
    grandfather.bio = Some("Family patriarch".to_string());
    let grandfather = manager.create_person(&space.id, &admin.id, grandfather)?;

    let mut grandmother = person("Fatima", "Aoudi", "فاطمة", "العودي", Gender::Female);
    grandmother.bio = Some("Family matriarch".to_string());
    let grandmother = manager.create_person(&space.id, &admin.id, grandmother)?;

    // Generation 2
    let father = manager.create_person(
        &space.id,
        &admin.id,
        person("Mohammed", "Aoudi", "محمد", "العودي", Gender::Male),
    )?;
    let mother = manager.create_person(
        &space.id,
        &admin.id,
        person("Nour", "Aoudi", "نور", "العودي", Gender::Female),
    )?;

    // Generation 3
    let child1 = manager.create_person(
        &space.id,
        &admin.id,
        person("Wael", "Aoudi", "وائل", "العودي", Gender::Male),
    )?;
    let child2 = manager.create_person(
        &space.id,
        &admin.id,
        person("Sara", "Aoudi", "سارة", "العودي", Gender::Female),
    )?;

    let spouse = RelationshipKind::Spouse(SpouseKind::Married);
    let parent_child = RelationshipKind::ParentChild(Lineage::Biological);

    manager.create_relationship(
        &space.id,
        &admin.id,
        RelationshipInput::new(grandfather.id, grandmother.id, spouse),
    )?;
    manager.create_relationship(
        &space.id,
        &admin.id,
        RelationshipInput::new(grandfather.id, father.id, parent_child),
    )?;
    manager.create_relationship(
        &space.id,
        &admin.id,
        RelationshipInput::new(grandmother.id, father.id, parent_child),
    )?;
    manager.create_relationship(
        &space.id,
        &admin.id,
        RelationshipInput::new(father.id, mother.id, spouse),
    )?;

    for child in [child1.id, child2.id] {
        manager.create_relationship(
            &space.id,
            &admin.id,
            RelationshipInput::new(father.id, child, parent_child),
        )?;
        manager.create_relationship(
            &space.id,
            &admin.id,
            RelationshipInput::new(mother.id, child, parent_child),
        )?;
    }

    info!(
        "Seeded demo space \"{}\" ({}) with 6 people",
        space.name, space.id
    );

    Ok((admin.id, space.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::visibility::TreeMode;

    #[test]
    fn test_seed_builds_three_generations() {
        let manager = SpaceManager::new();
        let (admin, space) = seed_demo_space(&manager).unwrap();

        let overview = manager.overview(&space, Some(&admin)).unwrap();
        assert_eq!(overview.person_count, 6);

        // 2 spouse edges + 6 parent-child edges
        let view = manager
            .tree_view(&space, Some(&admin), None, TreeMode::Mixed, 3)
            .unwrap();
        assert_eq!(view.layout.edges.len(), 8);
    }
}
