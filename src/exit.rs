// src/exit.rs
//! Standardized process exit codes for `follownet`.
//!
//! Provides a stable contract for scripts and automation.

use std::process::Termination;

use crate::error::FollowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum FollownetExit {
    /// Operation completed successfully.
    Success = 0,
    /// Generic error (e.g. IO, config).
    Error = 1,
    /// The request was rejected (duplicate user, unknown user, bad target, not following).
    Rejected = 2,
    /// The store file is unreadable or inconsistent under the strict policy.
    CorruptStore = 3,
}

impl FollownetExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }

    /// Classifies an error by the first [`FollowError`] in its chain.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        let domain = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<FollowError>());

        match domain {
            Some(FollowError::CorruptData { .. }) => Self::CorruptStore,
            Some(e) if e.is_rejection() => Self::Rejected,
            _ => Self::Error,
        }
    }
}

impl Termination for FollownetExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let code = self.code() as u8;
        std::process::ExitCode::from(code)
    }
}

impl From<anyhow::Result<()>> for FollownetExit {
    fn from(res: anyhow::Result<()>) -> Self {
        match res {
            Ok(()) => Self::Success,
            Err(e) => Self::from_error(&e),
        }
    }
}
