//! Concierge runtime: the model tool-use loop and everything around it.
//!
//! # Overview
//!
//! - **Tools**: the [`ToolRegistry`] advertises the concierge tools and
//!   dispatches model calls against the catalog and shortlist store.
//! - **Roster**: [`ModelRoster`] orders the candidate models and tracks the
//!   one currently in use.
//! - **Orchestrator**: [`Orchestrator::respond`] runs one exchange, failing
//!   over between candidates and falling back to canned answers.
//! - **Service**: [`ChatService::chat`] wraps the orchestrator with input
//!   policy, daily quotas and sessions.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use catalog::Catalog;
//! use policy::Policy;
//! use runtime::{ChatRequest, ChatService, GeminiBackend, Identity, ModelRoster, Orchestrator, ToolRegistry};
//! use storage::{SessionStore, ShortlistStore, UsageTracker};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tools = ToolRegistry::concierge(Arc::new(Catalog::builtin()?), Arc::new(ShortlistStore::new()));
//! let backend = GeminiBackend::builder("AIza...").build();
//! let orchestrator = Orchestrator::new(Some(backend), Arc::new(ModelRoster::default()), Arc::new(tools));
//! let service = ChatService::new(
//!     orchestrator,
//!     &Policy::default(),
//!     Arc::new(SessionStore::new()),
//!     Arc::new(UsageTracker::new()),
//! )?;
//!
//! let response = service
//!     .chat(ChatRequest {
//!         session_id: None,
//!         message: "Kundan sets under 3 lakh in Jaipur?".into(),
//!         identity: Identity::guest("127.0.0.1"),
//!     })
//!     .await?;
//! println!("{}", response.message);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
mod context;
mod error;
pub mod fallback;
pub mod llm;
mod orchestrator;
pub mod providers;
mod roster;
mod service;
pub mod tools;

pub use context::extract_context;
pub use error::{Error, Result};
pub use orchestrator::{DEFAULT_EXCHANGE_TIMEOUT, DEFAULT_MAX_ROUNDS, Orchestrator, Reply};
pub use providers::{GeminiBackend, GeminiBackendBuilder};
pub use roster::{CandidateStatus, DailyLimit, ModelCandidate, ModelRoster, ModelTier};
pub use service::{
    ChatRequest, ChatResponse, ChatService, DEFAULT_HISTORY_WINDOW, Identity, Nudge, NudgeKind,
};
pub use tools::{Tool, ToolError, ToolRegistry};
