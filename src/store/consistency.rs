// src/store/consistency.rs
//! Invariant checks for a loaded user table.
//!
//! A table is consistent when every edge is recorded from both endpoints, no
//! user relates to themselves, every name is a valid username, and every
//! referenced name is registered.

use crate::types::{is_valid_username, UserTable};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyIssue {
    /// `follower` lists `followed` but `followed` does not list `follower`.
    MissingFollower { follower: String, followed: String },
    /// `followed` lists `follower` but `follower` does not list `followed`.
    MissingFollowing { follower: String, followed: String },
    SelfReference { user: String },
    DanglingReference { user: String, missing: String },
    /// A registered key that `register` would refuse.
    InvalidUsername { name: String },
    /// `user` lists a name that `register` would refuse.
    InvalidReference { user: String, name: String },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFollower { follower, followed } => write!(
                f,
                "{follower} follows {followed}, but {followed} does not list {follower} as a follower"
            ),
            Self::MissingFollowing { follower, followed } => write!(
                f,
                "{followed} lists {follower} as a follower, but {follower} does not follow {followed}"
            ),
            Self::SelfReference { user } => write!(f, "{user} relates to themselves"),
            Self::DanglingReference { user, missing } => {
                write!(f, "{user} references unregistered user {missing}")
            }
            Self::InvalidUsername { name } => write!(f, "invalid username {name:?}"),
            Self::InvalidReference { user, name } => {
                write!(f, "{user} references invalid username {name:?}")
            }
        }
    }
}

/// Result of a consistency pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub issues: Vec<ConsistencyIssue>,
}

impl ConsistencyReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// One line per issue, for diagnostics.
    #[must_use]
    pub fn summary(&self) -> String {
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Lists every invariant violation in `users`, sorted and without duplicates.
#[must_use]
pub fn verify(users: &UserTable) -> ConsistencyReport {
    let mut issues = BTreeSet::new();

    for (name, record) in users {
        if !is_valid_username(name) {
            issues.insert(ConsistencyIssue::InvalidUsername { name: name.clone() });
            continue;
        }
        for bad in record
            .following
            .iter()
            .chain(&record.followers)
            .filter(|n| !is_valid_username(n))
        {
            issues.insert(ConsistencyIssue::InvalidReference {
                user: name.clone(),
                name: bad.clone(),
            });
        }
        if record.following.contains(name) || record.followers.contains(name) {
            issues.insert(ConsistencyIssue::SelfReference { user: name.clone() });
        }
        check_following(users, name, &record.following, &mut issues);
        check_followers(users, name, &record.followers, &mut issues);
    }

    ConsistencyReport {
        issues: issues.into_iter().collect(),
    }
}

fn check_following(
    users: &UserTable,
    name: &str,
    following: &BTreeSet<String>,
    issues: &mut BTreeSet<ConsistencyIssue>,
) {
    for followed in following
        .iter()
        .filter(|f| f.as_str() != name && is_valid_username(f))
    {
        match users.get(followed) {
            None => {
                issues.insert(dangling(name, followed));
            }
            Some(other) if !other.followers.contains(name) => {
                issues.insert(ConsistencyIssue::MissingFollower {
                    follower: name.to_string(),
                    followed: followed.clone(),
                });
            }
            Some(_) => {}
        }
    }
}

fn check_followers(
    users: &UserTable,
    name: &str,
    followers: &BTreeSet<String>,
    issues: &mut BTreeSet<ConsistencyIssue>,
) {
    for follower in followers
        .iter()
        .filter(|f| f.as_str() != name && is_valid_username(f))
    {
        match users.get(follower) {
            None => {
                issues.insert(dangling(name, follower));
            }
            Some(other) if !other.following.contains(name) => {
                issues.insert(ConsistencyIssue::MissingFollowing {
                    follower: follower.clone(),
                    followed: name.to_string(),
                });
            }
            Some(_) => {}
        }
    }
}

fn dangling(user: &str, missing: &str) -> ConsistencyIssue {
    ConsistencyIssue::DanglingReference {
        user: user.to_string(),
        missing: missing.to_string(),
    }
}

/// Reconciles `users` in place: one-sided edges are completed on the other
/// side; self, dangling and invalid references are dropped, as are records
/// under invalid usernames. Returns what was fixed.
pub fn repair(users: &mut UserTable) -> Vec<ConsistencyIssue> {
    let report = verify(users);

    for issue in &report.issues {
        apply_fix(users, issue);
    }

    report.issues
}

fn apply_fix(users: &mut UserTable, issue: &ConsistencyIssue) {
    match issue {
        ConsistencyIssue::MissingFollower { follower, followed } => {
            if let Some(rec) = users.get_mut(followed) {
                rec.followers.insert(follower.clone());
            }
        }
        ConsistencyIssue::MissingFollowing { follower, followed } => {
            if let Some(rec) = users.get_mut(follower) {
                rec.following.insert(followed.clone());
            }
        }
        ConsistencyIssue::SelfReference { user } => {
            if let Some(rec) = users.get_mut(user) {
                rec.following.remove(user);
                rec.followers.remove(user);
            }
        }
        ConsistencyIssue::DanglingReference { user, missing: name }
        | ConsistencyIssue::InvalidReference { user, name } => {
            if let Some(rec) = users.get_mut(user) {
                rec.following.remove(name);
                rec.followers.remove(name);
            }
        }
        ConsistencyIssue::InvalidUsername { name } => {
            users.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(json: &str) -> UserTable {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn consistent_table_has_no_issues() {
        let users = table(
            r#"{"Bo": {"following": ["Ama"], "followers": []},
                "Ama": {"following": [], "followers": ["Bo"]}}"#,
        );
        assert!(verify(&users).is_ok());
    }

    #[test]
    fn one_sided_following_is_reported_and_completed() {
        let mut users = table(
            r#"{"Bo": {"following": ["Ama"], "followers": []},
                "Ama": {"following": [], "followers": []}}"#,
        );
        let report = verify(&users);
        assert_eq!(
            report.issues,
            vec![ConsistencyIssue::MissingFollower {
                follower: "Bo".into(),
                followed: "Ama".into()
            }]
        );

        repair(&mut users);
        assert!(users["Ama"].followers.contains("Bo"));
        assert!(verify(&users).is_ok());
    }

    #[test]
    fn one_sided_follower_is_completed() {
        let mut users = table(
            r#"{"Bo": {"following": [], "followers": []},
                "Ama": {"following": [], "followers": ["Bo"]}}"#,
        );
        let fixed = repair(&mut users);
        assert_eq!(fixed.len(), 1);
        assert!(users["Bo"].following.contains("Ama"));
    }

    #[test]
    fn self_and_dangling_references_are_dropped() {
        let mut users = table(
            r#"{"Bo": {"following": ["Bo", "Zed"], "followers": ["Zed"]}}"#,
        );
        let report = verify(&users);
        // Zed appears twice but is reported once.
        assert_eq!(report.issues.len(), 2);

        repair(&mut users);
        assert!(users["Bo"].is_empty());
        assert!(verify(&users).is_ok());
    }

    #[test]
    fn invalid_names_are_reported_and_dropped() {
        let mut users = table(
            r#"{"": {"following": ["Ama"]},
                " Bo ": {},
                "Ama": {"following": [""], "followers": [""]}}"#,
        );
        let report = verify(&users);
        assert!(report.issues.contains(&ConsistencyIssue::InvalidUsername { name: String::new() }));
        assert!(report.issues.contains(&ConsistencyIssue::InvalidUsername {
            name: " Bo ".into()
        }));
        assert!(report.issues.contains(&ConsistencyIssue::InvalidReference {
            user: "Ama".into(),
            name: String::new()
        }));
        // An invalid name is never treated as a real edge endpoint.
        assert!(!report
            .issues
            .iter()
            .any(|i| matches!(i, ConsistencyIssue::MissingFollower { .. })));

        repair(&mut users);
        assert_eq!(users.keys().collect::<Vec<_>>(), ["Ama"]);
        assert!(users["Ama"].is_empty());
        assert!(verify(&users).is_ok());
    }

    #[test]
    fn summary_joins_issues() {
        let users = table(r#"{"Bo": {"following": ["Bo"]}}"#);
        assert_eq!(verify(&users).summary(), "Bo relates to themselves");
    }
}
