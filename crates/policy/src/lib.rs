//! Safety and quota policy for the concierge.
//!
//! Core principle: **user text is checked before the model sees it, and model
//! text is reviewed before the user sees it.**
//!
//! [`Policy`] is plain configuration (TOML-loadable). [`Guard`] is the compiled
//! form used at runtime: it validates and sanitises input, softens
//! overconfident replies, and flags questions that deserve a human expert.

mod error;
mod guard;
mod policy;
mod tier;

pub use error::{Error, Result};
pub use guard::Guard;
pub use policy::{Decision, EscalationRules, InputRules, Policy, UsageLimits};
pub use tier::Tier;
