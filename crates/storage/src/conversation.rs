//! Conversation types shared between the session store and the runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

/// A unique identifier for a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::InvalidId(s.to_string()))
    }
}

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One executed tool call: what was asked and what came back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub args: Value,
    pub result: Value,
}

/// A message in a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolInvocation>,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            timestamp: Utc::now(),
        }
    }
}

/// Shopping preferences picked up over the conversation.
///
/// Every field is optional; unset fields are omitted when serialized so the
/// model only sees what is actually known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Budget in INR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wedding_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl Context {
    /// True when no preference has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.budget.is_none()
            && self.city.as_deref().is_none_or(str::is_empty)
            && self.style.as_deref().is_none_or(str::is_empty)
            && self.wedding_date.as_deref().is_none_or(str::is_empty)
            && self.categories.is_empty()
    }

    /// Overlay the fields set in `update`.
    pub fn merge(&mut self, update: &Context) {
        if update.budget.is_some() {
            self.budget = update.budget;
        }
        if update.city.is_some() {
            self.city = update.city.clone();
        }
        if update.style.is_some() {
            self.style = update.style.clone();
        }
        if update.wedding_date.is_some() {
            self.wedding_date = update.wedding_date.clone();
        }
        for category in &update.categories {
            if !self.categories.contains(category) {
                self.categories.push(category.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_round_trips_through_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn bad_session_id_is_rejected() {
        assert!(matches!(
            "not-a-uuid".parse::<SessionId>(),
            Err(Error::InvalidId(_))
        ));
    }

    #[test]
    fn empty_context() {
        assert!(Context::default().is_empty());
        let blank_city = Context {
            city: Some(String::new()),
            ..Default::default()
        };
        assert!(blank_city.is_empty());
    }

    #[test]
    fn merge_keeps_existing_fields() {
        let mut context = Context {
            city: Some("Mumbai".into()),
            ..Default::default()
        };
        context.merge(&Context {
            budget: Some(300_000.0),
            ..Default::default()
        });
        assert_eq!(context.city.as_deref(), Some("Mumbai"));
        assert_eq!(context.budget, Some(300_000.0));
        assert!(!context.is_empty());
    }

    #[test]
    fn context_skips_unset_fields() {
        let context = Context {
            style: Some("modern".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&context).unwrap();
        assert_eq!(json, r#"{"style":"modern"}"#);
    }

    #[test]
    fn turn_serialization_omits_empty_tool_calls() {
        let turn = Turn::user("hello");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["role"], "user");
        assert!(value.get("tool_calls").is_none());
    }
}
