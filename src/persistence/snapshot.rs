//! JSON snapshot storage
//!
//! One file per space under `<base>/spaces/`, plus `users.json` for the
//! directory. Files are written atomically (temp file, then rename) so a
//! crash mid-write never leaves a torn snapshot behind.

use crate::space::{SpaceSnapshot, User};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Snapshot storage errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// File-backed snapshot store
pub struct SnapshotStore {
    base_path: PathBuf,
}

impl SnapshotStore {
    /// Open or create a snapshot store rooted at `path`
    pub fn open(path: impl AsRef<Path>) -> SnapshotResult<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(base_path.join("spaces"))?;
        info!("Snapshot store at {:?}", base_path);
        Ok(SnapshotStore { base_path })
    }

    fn spaces_dir(&self) -> PathBuf {
        self.base_path.join("spaces")
    }

    fn users_path(&self) -> PathBuf {
        self.base_path.join("users.json")
    }

    /// Write one space's snapshot
    pub fn save_space(&self, snapshot: &SpaceSnapshot) -> SnapshotResult<()> {
        let path = self
            .spaces_dir()
            .join(format!("{}.json", snapshot.space.id.as_str()));
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        write_atomic(&path, &bytes)?;
        Ok(())
    }

    /// Load every space snapshot found on disk
    pub fn load_spaces(&self) -> SnapshotResult<Vec<SpaceSnapshot>> {
        let mut snapshots = Vec::new();
        for entry in fs::read_dir(self.spaces_dir())? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path)?;
            snapshots.push(serde_json::from_slice(&bytes)?);
        }
        Ok(snapshots)
    }

    /// Write the full user directory
    pub fn save_users(&self, users: &[User]) -> SnapshotResult<()> {
        let bytes = serde_json::to_vec_pretty(users)?;
        write_atomic(&self.users_path(), &bytes)?;
        Ok(())
    }

    /// Load the user directory; an absent file is an empty directory
    pub fn load_users(&self) -> SnapshotResult<Vec<User>> {
        let path = self.users_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FamilyGraph;
    use crate::space::{FamilySpace, SpaceId, SpaceQuotas};
    use tempfile::TempDir;

    fn snapshot(id: &str) -> SpaceSnapshot {
        SpaceSnapshot {
            space: FamilySpace {
                id: SpaceId::from(id),
                name: "Test".to_string(),
                description: None,
                created_at: 0,
            },
            quotas: SpaceQuotas::default(),
            graph: FamilyGraph::new().snapshot(),
            memberships: Vec::new(),
            claims: Vec::new(),
            next_claim_id: 1,
            links: Vec::new(),
            invitations: Vec::new(),
        }
    }

    #[test]
    fn test_space_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        store.save_space(&snapshot("s1")).unwrap();
        store.save_space(&snapshot("s2")).unwrap();

        let loaded = store.load_spaces().unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        let mut snap = snapshot("s1");
        store.save_space(&snap).unwrap();
        snap.space.name = "Renamed".to_string();
        store.save_space(&snap).unwrap();

        let loaded = store.load_spaces().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].space.name, "Renamed");
    }

    #[test]
    fn test_users_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        assert!(store.load_users().unwrap().is_empty());

        let users = vec![User::new("a@family.test", "A")];
        store.save_users(&users).unwrap();

        let loaded = store.load_users().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].email, "a@family.test");
    }

    #[test]
    fn test_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        assert!(store.load_spaces().unwrap().is_empty());
    }
}
