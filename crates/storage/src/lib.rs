//! In-memory state for concierge conversations.
//!
//! This crate owns everything the concierge remembers between requests: chat
//! sessions and their turns, the shopping context extracted from them, daily
//! usage counters, and saved shortlists. Nothing here is durable; every store
//! is a keyed map behind a lock, with expiry sweeps for data that ages out.
//!
//! # Core Concepts
//!
//! ## SessionStore
//!
//! The [`SessionStore`] maps a [`SessionId`] to a [`Session`]. Sessions expire
//! after 24 hours without activity (any read or write counts as activity) and
//! keep at most [`MAX_TURNS_PER_SESSION`] turns.
//!
//! ## Turn and ToolInvocation
//!
//! A [`Turn`] is one user or assistant message. Assistant turns carry the
//! [`ToolInvocation`]s executed while producing them, in execution order.
//!
//! ## Context
//!
//! A [`Context`] is a sparse record of preferences (budget, city, style, ...)
//! merged into the session as they are mentioned.
//!
//! ## UsageTracker
//!
//! The [`UsageTracker`] counts messages per identifier per UTC day. Limits are
//! supplied by the caller so tiers stay a policy concern.
//!
//! ## ShortlistStore
//!
//! The [`ShortlistStore`] keeps saved product picks with shareable links for
//! [`SHORTLIST_RETENTION_DAYS`] days.
//!
//! # Example
//!
//! ```
//! use storage::{SessionStore, Turn};
//!
//! let store = SessionStore::new();
//! let session = store.create(None);
//! store.append(session.id, Turn::user("Need a kundan set"))?;
//! store.append(session.id, Turn::assistant("Here are three options", vec![]))?;
//!
//! let history = store.history(session.id, 10)?;
//! assert_eq!(history.len(), 2);
//! # Ok::<(), storage::Error>(())
//! ```

mod conversation;
mod error;
mod sessions;
mod shortlist;
mod usage;

pub use conversation::{Context, Role, SessionId, ToolInvocation, Turn};
pub use error::{Error, Result};
pub use sessions::{DEFAULT_SESSION_TTL_HOURS, MAX_TURNS_PER_SESSION, Session, SessionStore};
pub use shortlist::{
    AddOutcome, SHORTLIST_RETENTION_DAYS, Shortlist, ShortlistItem, ShortlistOptions,
    ShortlistStore,
};
pub use usage::{UsageStatus, UsageTracker};
