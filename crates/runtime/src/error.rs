use crate::llm::ModelError;
use policy::Tier;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the orchestrator and the chat service.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The model kept requesting tools past the round limit.
    #[error("model still requesting tools after {rounds} rounds")]
    ProtocolBoundExceeded { rounds: u32 },

    #[error("exchange exceeded its {0:?} budget")]
    DeadlineExceeded(Duration),

    /// The message was rejected before reaching the model.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{message}")]
    UsageExceeded {
        tier: Tier,
        limit: u32,
        message: String,
    },

    #[error("session not found or expired: {0}")]
    SessionNotFound(String),

    #[error(transparent)]
    Storage(#[from] storage::Error),

    #[error(transparent)]
    Policy(#[from] policy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
