//! Error type shared by the engine and the store.

use thiserror::Error;

/// Everything that can go wrong inside the core.
///
/// None of these are fatal: the engine reports no-op reasons through
/// [`crate::Outcome::skipped`], the store returns them from `deserialize`
/// and leaves the caller's state alone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestError {
    #[error("invalid boss config: {0}")]
    InvalidBossConfig(String),

    #[error("malformed state: {0}")]
    MalformedState(String),

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("task already completed: {0}")]
    AlreadyCompleted(String),

    #[error("task is not completed: {0}")]
    NotCompleted(String),

    #[error("no active boss")]
    NoActiveBoss,

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("completing {0} would overflow the XP total")]
    XpOverflow(String),
}

impl QuestError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedState(msg.into())
    }
}
