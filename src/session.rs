// src/session.rs
//! The active user's view of the follow graph.

use crate::error::{FollowError, Result};
use crate::store::RelationshipStore;
use std::collections::BTreeSet;

/// A materialized copy of one user's relationships.
///
/// Mutations go through the store; the local copies are re-read afterwards
/// so they never drift from what is persisted.
#[derive(Debug)]
pub struct UserSession<'a> {
    store: &'a mut RelationshipStore,
    username: String,
    following: BTreeSet<String>,
    followers: BTreeSet<String>,
}

impl<'a> UserSession<'a> {
    /// Opens a session for a registered user.
    ///
    /// # Errors
    /// Returns `UnknownUser` if `username` is not in the directory.
    pub fn open(store: &'a mut RelationshipStore, username: &str) -> Result<Self> {
        let record = store
            .record(username)
            .ok_or_else(|| FollowError::UnknownUser(username.to_string()))?;
        let following = record.following().clone();
        let followers = record.followers().clone();

        Ok(Self {
            store,
            username: username.to_string(),
            following,
            followers,
        })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn store(&self) -> &RelationshipStore {
        &*self.store
    }

    /// # Errors
    /// See [`RelationshipStore::follow`].
    pub fn follow(&mut self, target: &str) -> Result<()> {
        let outcome = self.store.follow(&self.username, target);
        self.refresh();
        outcome
    }

    /// # Errors
    /// See [`RelationshipStore::unfollow`].
    pub fn unfollow(&mut self, target: &str) -> Result<()> {
        let outcome = self.store.unfollow(&self.username, target);
        self.refresh();
        outcome
    }

    /// Re-reads both sets from the store.
    pub fn refresh(&mut self) {
        if let Some(record) = self.store.record(&self.username) {
            self.following.clone_from(record.following());
            self.followers.clone_from(record.followers());
        }
    }

    #[must_use]
    pub fn list_following(&self) -> Vec<&str> {
        self.following.iter().map(String::as_str).collect()
    }

    #[must_use]
    pub fn list_followers(&self) -> Vec<&str> {
        self.followers.iter().map(String::as_str).collect()
    }

    /// Registered users this user could still follow.
    #[must_use]
    pub fn suggestions(&self) -> Vec<&str> {
        self.store
            .users()
            .filter(|u| *u != self.username && !self.following.contains(*u))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_exclude_self_and_followed() {
        let mut store = RelationshipStore::in_memory(["Ama", "Siaw", "Bo"]).unwrap();
        let mut session = UserSession::open(&mut store, "Bo").unwrap();
        session.follow("Ama").unwrap();
        assert_eq!(session.suggestions(), ["Siaw"]);
    }

    #[test]
    fn failed_follow_leaves_view_unchanged() {
        let mut store = RelationshipStore::in_memory(["Ama", "Bo"]).unwrap();
        let mut session = UserSession::open(&mut store, "Bo").unwrap();
        assert!(session.follow("Bo").is_err());
        assert!(session.list_following().is_empty());
    }

    #[test]
    fn view_tracks_changes_made_elsewhere_after_refresh() {
        let mut store = RelationshipStore::in_memory(["Ama", "Bo"]).unwrap();
        store.follow("Ama", "Bo").unwrap();
        let session = UserSession::open(&mut store, "Bo").unwrap();
        assert_eq!(session.list_followers(), ["Ama"]);
        assert_eq!(session.store().edge_count(), 1);
    }
}
