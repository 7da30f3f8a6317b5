// src/events.rs
//! Machine-readable event logging for audit trails.
//!
//! Events are appended as JSON lines, by default to `.follownet/events.jsonl`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_EVENT_LOG: &str = ".follownet/events.jsonl";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StoreLoaded {
        users: usize,
        edges: usize,
        seeded: bool,
    },
    StoreRepaired {
        fixes: usize,
    },
    StoreSaved {
        path: String,
        users: usize,
    },
    SaveFailed {
        path: String,
        error: String,
    },
    UserRegistered {
        username: String,
    },
    Followed {
        follower: String,
        followed: String,
    },
    Unfollowed {
        follower: String,
        followed: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowEvent {
    pub timestamp: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
pub struct EventLogger {
    log_path: PathBuf,
}

impl EventLogger {
    #[must_use]
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn log(&self, kind: EventKind) {
        // Best-effort: a broken log never fails a follow/unfollow.
        if let Ok(json) = Self::serialize_event(kind) {
            let _ = self.append_to_file(&json);
        }
    }

    fn serialize_event(kind: EventKind) -> Result<String> {
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let event = FollowEvent { timestamp, kind };
        Ok(serde_json::to_string(&event)?)
    }

    fn append_to_file(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// Reads back every well-formed event in a log file. Malformed lines are skipped.
///
/// # Errors
/// Returns error if the file cannot be read.
pub fn read_events(path: &Path) -> Result<Vec<FollowEvent>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let logger = EventLogger::new(dir.path().join("nested").join("events.jsonl"));

        logger.log(EventKind::UserRegistered {
            username: "Bo".into(),
        });
        logger.log(EventKind::Followed {
            follower: "Bo".into(),
            followed: "Ama".into(),
        });

        let events = read_events(logger.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1].kind,
            EventKind::Followed {
                follower: "Bo".into(),
                followed: "Ama".into()
            }
        );
    }

    #[test]
    fn unwritable_log_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every append fail.
        let logger = EventLogger::new(dir.path());
        logger.log(EventKind::StoreRepaired { fixes: 1 });
    }
}
