// src/store/mod.rs
//! The authoritative follow graph and its write-through JSON file.

pub mod consistency;
pub mod storage;

pub use consistency::{ConsistencyIssue, ConsistencyReport};

use crate::error::{FollowError, Result, TargetReason};
use crate::events::{EventKind, EventLogger};
use crate::types::{
    is_valid_username, ConsistencyPolicy, Edge, RelationshipRecord, UserTable, DEFAULT_SEED,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Settings applied when a store is loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub seed: Vec<String>,
    pub policy: ConsistencyPolicy,
    pub events: Option<EventLogger>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED.iter().map(ToString::to_string).collect(),
            policy: ConsistencyPolicy::default(),
            events: None,
        }
    }
}

/// Owns every user's [`RelationshipRecord`].
///
/// Each mutation updates both endpoints of the edge, then persists the whole
/// table. If persisting fails the mutation is undone, so memory and disk never
/// disagree.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    users: UserTable,
    backing: Option<PathBuf>,
    events: Option<EventLogger>,
    repairs: Vec<ConsistencyIssue>,
}

impl RelationshipStore {
    /// An unpersisted store holding the given users with empty records.
    ///
    /// # Errors
    /// Returns `InvalidUsername` if any seed name is invalid.
    pub fn in_memory<I, S>(seed: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            users: seeded_table(seed)?,
            ..Self::default()
        })
    }

    /// Loads the store file at `path`, seeding a fresh directory if it does
    /// not exist yet. The file is not written until the first mutation.
    ///
    /// # Errors
    /// Returns `CorruptData` if the file does not parse, or breaks the
    /// consistency invariants under [`ConsistencyPolicy::Strict`]. Returns
    /// `Io` if it cannot be read.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self> {
        let (mut users, seeded) = match storage::read_table(path)? {
            Some(users) => (users, false),
            None => (seeded_table(options.seed.iter().cloned())?, true),
        };

        let repairs = reconcile(&mut users, path, options.policy)?;

        let store = Self {
            users,
            backing: Some(path.to_path_buf()),
            events: options.events.clone(),
            repairs,
        };

        store.log(EventKind::StoreLoaded {
            users: store.len(),
            edges: store.edge_count(),
            seeded,
        });
        if !store.repairs.is_empty() {
            store.log(EventKind::StoreRepaired {
                fixes: store.repairs.len(),
            });
        }

        Ok(store)
    }

    /// Attaches an event log to an existing store.
    #[must_use]
    pub fn with_events(mut self, events: EventLogger) -> Self {
        self.events = Some(events);
        self
    }

    /// Issues reconciled while loading (always empty under `Strict`).
    #[must_use]
    pub fn repairs(&self) -> &[ConsistencyIssue] {
        &self.repairs
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.backing.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Registered usernames in sorted order.
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    #[must_use]
    pub fn record(&self, username: &str) -> Option<&RelationshipRecord> {
        self.users.get(username)
    }

    /// # Errors
    /// Returns `UnknownUser` if `username` is not registered.
    pub fn following(&self, username: &str) -> Result<&BTreeSet<String>> {
        self.require(username).map(RelationshipRecord::following)
    }

    /// # Errors
    /// Returns `UnknownUser` if `username` is not registered.
    pub fn followers(&self, username: &str) -> Result<&BTreeSet<String>> {
        self.require(username).map(RelationshipRecord::followers)
    }

    #[must_use]
    pub fn is_following(&self, follower: &str, followed: &str) -> bool {
        self.users
            .get(follower)
            .is_some_and(|r| r.following.contains(followed))
    }

    /// Every `follower -> followed` pair, sorted by follower then followed.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.users
            .iter()
            .flat_map(|(name, rec)| rec.following.iter().map(move |f| Edge::new(name, f)))
            .collect()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.users.values().map(|r| r.following.len()).sum()
    }

    /// Checks the in-memory table against the invariants.
    #[must_use]
    pub fn verify(&self) -> ConsistencyReport {
        consistency::verify(&self.users)
    }

    /// Adds a user with an empty record.
    ///
    /// # Errors
    /// Returns `InvalidUsername`, `DuplicateUser`, or `Io` if persisting fails.
    pub fn register(&mut self, username: &str) -> Result<()> {
        if !is_valid_username(username) {
            return Err(FollowError::InvalidUsername(username.to_string()));
        }
        if self.contains(username) {
            return Err(FollowError::DuplicateUser(username.to_string()));
        }

        self.users
            .insert(username.to_string(), RelationshipRecord::default());

        if let Err(e) = self.persist() {
            self.users.remove(username);
            return Err(e);
        }

        self.log(EventKind::UserRegistered {
            username: username.to_string(),
        });
        Ok(())
    }

    /// Records that `follower` follows `followed`. Following twice is a no-op.
    ///
    /// # Errors
    /// Returns `InvalidTarget` for a self-follow or unregistered target,
    /// `UnknownUser` for an unregistered follower, or `Io` if persisting fails.
    pub fn follow(&mut self, follower: &str, followed: &str) -> Result<()> {
        if follower == followed {
            return Err(invalid_target(followed, TargetReason::SelfFollow));
        }
        if !self.contains(followed) {
            return Err(invalid_target(followed, TargetReason::NotRegistered));
        }
        self.require(follower)?;

        if self.is_following(follower, followed) {
            return Ok(());
        }

        self.link(follower, followed);
        if let Err(e) = self.persist() {
            self.unlink(follower, followed);
            return Err(e);
        }

        self.log(EventKind::Followed {
            follower: follower.to_string(),
            followed: followed.to_string(),
        });
        Ok(())
    }

    /// Removes the `follower -> followed` relation from both sides.
    ///
    /// # Errors
    /// Returns `NotFollowing` if the relation does not exist, or `Io` if
    /// persisting fails.
    pub fn unfollow(&mut self, follower: &str, followed: &str) -> Result<()> {
        if !self.is_following(follower, followed) {
            return Err(FollowError::NotFollowing {
                follower: follower.to_string(),
                followed: followed.to_string(),
            });
        }

        self.unlink(follower, followed);
        if let Err(e) = self.persist() {
            self.link(follower, followed);
            return Err(e);
        }

        self.log(EventKind::Unfollowed {
            follower: follower.to_string(),
            followed: followed.to_string(),
        });
        Ok(())
    }

    /// Writes the whole table to the backing file. A no-op for in-memory stores.
    ///
    /// # Errors
    /// Returns `Io` if the write fails.
    pub fn save(&self) -> Result<()> {
        self.persist()
    }

    /// Saves to `path` and makes it the backing file from now on.
    ///
    /// # Errors
    /// Returns `Io` if the write fails.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let previous = self.backing.replace(path.to_path_buf());
        if let Err(e) = self.persist() {
            self.backing = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Saves after copying the existing file to `<name>.bak`.
    ///
    /// # Errors
    /// Returns `Io` if the backup or the write fails.
    pub fn save_with_backup(&self) -> Result<Option<PathBuf>> {
        let backup = match self.path() {
            Some(path) if storage::file_exists(path)? => Some(storage::create_backup(path)?),
            _ => None,
        };

        self.persist()?;
        Ok(backup)
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };

        match storage::write_table(path, &self.users) {
            Ok(()) => {
                self.log(EventKind::StoreSaved {
                    path: path.display().to_string(),
                    users: self.len(),
                });
                Ok(())
            }
            Err(e) => {
                self.log(EventKind::SaveFailed {
                    path: path.display().to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn require(&self, username: &str) -> Result<&RelationshipRecord> {
        self.users
            .get(username)
            .ok_or_else(|| FollowError::UnknownUser(username.to_string()))
    }

    // Both endpoints are known to exist when these are called.
    fn link(&mut self, follower: &str, followed: &str) {
        if let Some(rec) = self.users.get_mut(follower) {
            rec.following.insert(followed.to_string());
        }
        if let Some(rec) = self.users.get_mut(followed) {
            rec.followers.insert(follower.to_string());
        }
    }

    fn unlink(&mut self, follower: &str, followed: &str) {
        if let Some(rec) = self.users.get_mut(follower) {
            rec.following.remove(followed);
        }
        if let Some(rec) = self.users.get_mut(followed) {
            rec.followers.remove(follower);
        }
    }

    fn log(&self, kind: EventKind) {
        if let Some(events) = &self.events {
            events.log(kind);
        }
    }
}

/// Runs the consistency checks against a store file without loading it as a
/// store. `None` if the file does not exist.
///
/// # Errors
/// Returns `CorruptData` if the file does not parse, or `Io` if unreadable.
pub fn inspect_file(path: &Path) -> Result<Option<ConsistencyReport>> {
    Ok(storage::read_table(path)?.map(|users| consistency::verify(&users)))
}

fn seeded_table<I, S>(seed: I) -> Result<UserTable>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut users = UserTable::new();
    for name in seed {
        let name = name.into();
        if !is_valid_username(&name) {
            return Err(FollowError::InvalidUsername(name));
        }
        users.entry(name).or_default();
    }
    Ok(users)
}

fn reconcile(
    users: &mut UserTable,
    path: &Path,
    policy: ConsistencyPolicy,
) -> Result<Vec<ConsistencyIssue>> {
    match policy {
        ConsistencyPolicy::Repair => Ok(consistency::repair(users)),
        ConsistencyPolicy::Strict => {
            let report = consistency::verify(users);
            if report.is_ok() {
                Ok(Vec::new())
            } else {
                Err(FollowError::CorruptData {
                    path: path.to_path_buf(),
                    detail: report.summary(),
                })
            }
        }
    }
}

fn invalid_target(target: &str, reason: TargetReason) -> FollowError {
    FollowError::InvalidTarget {
        target: target.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RelationshipStore {
        RelationshipStore::in_memory(["Ama", "Siaw", "Bo"]).unwrap()
    }

    #[test]
    fn follow_updates_both_sides() {
        let mut s = store();
        s.follow("Bo", "Ama").unwrap();
        assert!(s.following("Bo").unwrap().contains("Ama"));
        assert!(s.followers("Ama").unwrap().contains("Bo"));
        assert!(s.verify().is_ok());
    }

    #[test]
    fn validation_order_prefers_target_errors() {
        let mut s = store();
        // Unknown follower and unknown target: the target is reported.
        assert!(matches!(
            s.follow("Nobody", "Zed"),
            Err(FollowError::InvalidTarget {
                reason: TargetReason::NotRegistered,
                ..
            })
        ));
        assert!(matches!(
            s.follow("Nobody", "Ama"),
            Err(FollowError::UnknownUser(name)) if name == "Nobody"
        ));
    }

    #[test]
    fn unfollow_by_unknown_user_is_not_following() {
        let mut s = store();
        assert!(matches!(
            s.unfollow("Nobody", "Ama"),
            Err(FollowError::NotFollowing { .. })
        ));
    }

    #[test]
    fn seed_duplicates_collapse() {
        let s = RelationshipStore::in_memory(["Ama", "Ama"]).unwrap();
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn invalid_seed_is_rejected() {
        assert!(matches!(
            RelationshipStore::in_memory(["Ama", ""]),
            Err(FollowError::InvalidUsername(_))
        ));
    }

    #[test]
    fn edges_are_sorted() {
        let mut s = store();
        s.follow("Siaw", "Ama").unwrap();
        s.follow("Bo", "Siaw").unwrap();
        s.follow("Bo", "Ama").unwrap();
        let edges: Vec<String> = s.edges().iter().map(ToString::to_string).collect();
        assert_eq!(edges, ["Bo -> Ama", "Bo -> Siaw", "Siaw -> Ama"]);
        assert_eq!(s.edge_count(), 3);
    }

    #[test]
    fn in_memory_save_is_noop() {
        let s = store();
        assert!(s.save().is_ok());
        assert!(s.path().is_none());
    }
}
