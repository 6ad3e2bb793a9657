//! LLM provider adapters.
//!
//! Each provider implements [`Backend`](crate::llm::Backend) for its specific API.

mod gemini;

pub use gemini::{GEMINI_API_URL, GeminiBackend, GeminiBackendBuilder};
