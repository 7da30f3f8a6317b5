// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Cannot follow {target}: {reason}")]
    InvalidTarget { target: String, reason: TargetReason },

    #[error("{follower} is not following {followed}")]
    NotFollowing { follower: String, followed: String },

    #[error("Invalid username {0:?}: must be non-empty with no surrounding whitespace")]
    InvalidUsername(String),

    #[error("Corrupt store file {path}: {detail}")]
    CorruptData { path: PathBuf, detail: String },

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Why a follow target was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetReason {
    SelfFollow,
    NotRegistered,
}

impl std::fmt::Display for TargetReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfFollow => f.write_str("users cannot follow themselves"),
            Self::NotRegistered => f.write_str("no such user"),
        }
    }
}

impl FollowError {
    pub(crate) fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    /// True for rejections caused by the request itself rather than the
    /// environment (file system, corrupt data).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::DuplicateUser(_)
                | Self::UnknownUser(_)
                | Self::InvalidTarget { .. }
                | Self::NotFollowing { .. }
                | Self::InvalidUsername(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FollowError>;

// Allow `?` on std::io::Error by converting to FollowError::Io with unknown path.
impl From<std::io::Error> for FollowError {
    fn from(source: std::io::Error) -> Self {
        FollowError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
