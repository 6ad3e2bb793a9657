//! Chat entry point: input policy, quotas and sessions around the orchestrator.

use crate::context::extract_context;
use crate::error::{Error, Result};
use crate::llm::Backend;
use crate::orchestrator::Orchestrator;
use policy::{Decision, Guard, Policy, Tier, UsageLimits};
use serde::Serialize;
use std::sync::Arc;
use storage::{Context, Session, SessionId, SessionStore, ToolInvocation, Turn, UsageStatus, UsageTracker};

/// Turns of history sent with each message.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Who is chatting: a user id or a client address, and their tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub identifier: String,
    pub tier: Tier,
}

impl Identity {
    pub fn guest(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            tier: Tier::Guest,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Continue this session; unknown or expired ids start a new one.
    pub session_id: Option<SessionId>,
    pub message: String,
    pub identity: Identity,
}

/// A soft prompt to sign up or upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NudgeKind {
    Signup,
    Upgrade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Nudge {
    #[serde(rename = "type")]
    pub kind: NudgeKind,
    pub message: String,
}

impl Nudge {
    /// Guests are nudged after 6 session turns, free users after 12.
    fn for_session(tier: Tier, turns: usize) -> Option<Self> {
        match tier {
            Tier::Guest if turns >= 6 => Some(Self {
                kind: NudgeKind::Signup,
                message: "💡 Create a free account to save your preferences and get more messages!"
                    .to_string(),
            }),
            Tier::Free if turns >= 12 => Some(Self {
                kind: NudgeKind::Upgrade,
                message: "⭐ Upgrade to Premium for unlimited messages and expert assistance!"
                    .to_string(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub session_id: SessionId,
    pub message: String,
    pub tool_calls: Vec<ToolInvocation>,
    pub context: Context,
    pub usage: UsageStatus,
    pub model_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nudge: Option<Nudge>,
}

pub struct ChatService<B> {
    orchestrator: Orchestrator<B>,
    guard: Guard,
    limits: UsageLimits,
    sessions: Arc<SessionStore>,
    usage: Arc<UsageTracker>,
    history_window: usize,
}

impl<B: Backend> ChatService<B> {
    pub fn new(
        orchestrator: Orchestrator<B>,
        policy: &Policy,
        sessions: Arc<SessionStore>,
        usage: Arc<UsageTracker>,
    ) -> Result<Self> {
        Ok(Self {
            orchestrator,
            guard: Guard::new(policy)?,
            limits: policy.limits,
            sessions,
            usage,
            history_window: DEFAULT_HISTORY_WINDOW,
        })
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator<B> {
        &self.orchestrator
    }

    /// Handle one user message end to end.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let message = match self.guard.check_input(&request.message) {
            Decision::Allow { sanitized } => sanitized,
            Decision::Deny { reason } => return Err(Error::InvalidInput(reason)),
        };

        let identity = &request.identity;
        let limit = self.limits.for_tier(identity.tier);
        if !self.usage.check(&identity.identifier, limit).allowed {
            tracing::info!(identifier = %identity.identifier, tier = %identity.tier, limit, "daily limit reached");
            return Err(Error::UsageExceeded {
                tier: identity.tier,
                limit,
                message: identity.tier.limit_message().to_string(),
            });
        }

        let session_id = self.resolve_session(request.session_id, identity);
        let history = self.sessions.history(session_id, self.history_window)?;
        self.sessions.append(session_id, Turn::user(message.as_str()))?;

        let extracted = extract_context(&message);
        let context = if extracted.is_empty() {
            self.sessions.get(session_id)?.context
        } else {
            self.sessions.update_context(session_id, &extracted)?
        };

        let reply = self.orchestrator.respond(&message, &history, &context).await?;
        let answer = self
            .guard
            .with_expert_hint(self.guard.review_output(&reply.message), &message);

        self.sessions.append(
            session_id,
            Turn::assistant(answer.as_str(), reply.tool_calls.clone()),
        )?;
        let usage = self.usage.increment(&identity.identifier, limit);
        let turns = self.sessions.get(session_id)?.turns.len();

        Ok(ChatResponse {
            session_id,
            message: answer,
            tool_calls: reply.tool_calls,
            context,
            usage,
            model_used: reply.model_used,
            nudge: Nudge::for_session(identity.tier, turns),
        })
    }

    /// A live session by id.
    pub fn session(&self, id: SessionId) -> Result<Session> {
        self.sessions.get(id).map_err(|e| match e {
            storage::Error::SessionNotFound(id) => Error::SessionNotFound(id),
            other => Error::Storage(other),
        })
    }

    /// Today's quota for `identity`, without counting a message.
    pub fn usage_status(&self, identity: &Identity) -> UsageStatus {
        self.usage
            .check(&identity.identifier, self.limits.for_tier(identity.tier))
    }

    fn resolve_session(&self, requested: Option<SessionId>, identity: &Identity) -> SessionId {
        if let Some(id) = requested {
            if self.sessions.get(id).is_ok() {
                return id;
            }
            tracing::debug!(session = %id, "session expired or unknown; starting a new one");
        }
        let owner = (identity.tier != Tier::Guest).then(|| identity.identifier.clone());
        self.sessions.create(owner).id
    }
}
