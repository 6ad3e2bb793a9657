use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("session not found or expired: {0}")]
    SessionNotFound(String),

    #[error("shortlist not found: {0}")]
    ShortlistNotFound(String),

    #[error("invalid id: {0}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, Error>;
