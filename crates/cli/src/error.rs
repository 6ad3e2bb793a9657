//! CLI error types.

use crate::config::ConfigError;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or unreadable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The product catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] catalog::Error),

    /// An error occurred in the runtime layer.
    #[error(transparent)]
    Runtime(#[from] runtime::Error),

    /// Output could not be encoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// What to show the person chatting. Internal failures stay generic.
    pub fn user_message(&self) -> String {
        match self {
            Error::Runtime(runtime::Error::InvalidInput(reason)) => reason.clone(),
            Error::Runtime(runtime::Error::UsageExceeded { message, .. }) => message.clone(),
            Error::Runtime(runtime::Error::ProtocolBoundExceeded { .. }) => {
                "Sorry, I couldn't complete that request. Please try asking in a simpler way."
                    .to_string()
            }
            Error::Runtime(_) => "Something went wrong. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
