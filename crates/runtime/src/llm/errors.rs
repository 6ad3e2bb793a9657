use thiserror::Error;

/// Errors from LLM provider calls.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// The model does not exist or does not serve this endpoint.
    #[error("model {model} unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    /// The model's rate limit or daily quota is spent.
    #[error("quota exhausted for {model}: {message}")]
    QuotaExhausted { model: String, message: String },

    /// The API key is missing, malformed, or rejected.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// A network error occurred during the API call.
    #[error("network: {0}")]
    Network(String),

    /// The LLM provider returned an error response.
    #[error("provider api ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider response could not be parsed.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Classify a failed provider call by status code and error text.
    ///
    /// Checks run in a fixed order: unavailable, then quota, then credential.
    pub fn from_status(model: &str, status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 404 || message.contains("not found") {
            return Self::ModelUnavailable {
                model: model.to_string(),
                message,
            };
        }
        if status == 429 || message.contains("RESOURCE_EXHAUSTED") {
            return Self::QuotaExhausted {
                model: model.to_string(),
                message,
            };
        }
        if message.contains("API_KEY_INVALID") || message.contains("API key") {
            return Self::InvalidCredential(message);
        }
        Self::Api { status, message }
    }

    /// Whether the next roster candidate might succeed where this one failed.
    pub fn is_failover(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable { .. } | Self::QuotaExhausted { .. }
        )
    }
}
