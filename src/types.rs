// src/types.rs
//! Core data structures shared by the store, sessions and renderers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The full persisted collection: username -> relationships.
pub type UserTable = BTreeMap<String, RelationshipRecord>;

/// One user's view of the follow graph.
///
/// Fields are only mutated by [`crate::store::RelationshipStore`], which keeps
/// both endpoints of every edge in step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    #[serde(default)]
    pub(crate) following: BTreeSet<String>,
    #[serde(default)]
    pub(crate) followers: BTreeSet<String>,
}

impl RelationshipRecord {
    #[must_use]
    pub fn following(&self) -> &BTreeSet<String> {
        &self.following
    }

    #[must_use]
    pub fn followers(&self) -> &BTreeSet<String> {
        &self.followers
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.following.is_empty() && self.followers.is_empty()
    }
}

/// A directed follow relation, `follower -> followed`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub follower: String,
    pub followed: String,
}

impl Edge {
    #[must_use]
    pub fn new(follower: impl Into<String>, followed: impl Into<String>) -> Self {
        Self {
            follower: follower.into(),
            followed: followed.into(),
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.follower, self.followed)
    }
}

/// How a store file that breaks bidirectional consistency is treated on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyPolicy {
    /// Union one-sided edges and drop self/dangling references.
    #[default]
    Repair,
    /// Refuse to load with `CorruptData`.
    Strict,
}

/// Usernames seeded into a fresh store when no file exists yet.
pub const DEFAULT_SEED: &[&str] = &[
    "Logical", "Siaw", "Ama", "user4", "user5", "user6", "user7", "user8", "user9", "user10",
];

/// Checks a username is non-empty and carries no surrounding whitespace.
#[must_use]
pub fn is_valid_username(name: &str) -> bool {
    !name.is_empty() && name.trim() == name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_reads_missing_lists_as_empty() {
        let rec: RelationshipRecord = serde_json::from_str(r#"{"following": ["Ama"]}"#).unwrap();
        assert!(rec.following().contains("Ama"));
        assert!(rec.followers().is_empty());
    }

    #[test]
    fn duplicate_entries_collapse() {
        let rec: RelationshipRecord =
            serde_json::from_str(r#"{"following": ["Ama", "Ama"], "followers": []}"#).unwrap();
        assert_eq!(rec.following().len(), 1);
    }

    #[test]
    fn username_validation() {
        assert!(is_valid_username("Bo"));
        assert!(is_valid_username("two words"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("  "));
        assert!(!is_valid_username(" Bo"));
    }

    #[test]
    fn policy_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrap {
            p: ConsistencyPolicy,
        }
        let w: Wrap = toml::from_str("p = \"strict\"").unwrap();
        assert_eq!(w.p, ConsistencyPolicy::Strict);
    }
}
