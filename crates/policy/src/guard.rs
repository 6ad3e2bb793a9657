//! Compiled policy checks.

use crate::{Decision, Error, Policy, Result};
use regex::{Regex, RegexBuilder};

const EMPTY_REPLY: &str =
    "I apologize, but I couldn't generate a response. Please try rephrasing your question.";

const HELP_FOOTER: &str = "\n\n💡 **Need more help?** I can:\n- Search our catalog with different criteria\n- Connect you with a wedding expert\n- Show you popular options in your category";

const EXPERT_HINT: &str = "\n\n🌟 **This sounds like it might benefit from expert guidance!** Would you like me to connect you with one of our wedding planning specialists? They can provide personalized advice for complex requirements.";

/// Replies shorter than this (in characters) get the help footer.
const SHORT_REPLY_CHARS: usize = 50;

/// Runtime form of a [`Policy`], with every pattern compiled once.
#[derive(Debug, Clone)]
pub struct Guard {
    max_message_length: usize,
    blocked: Vec<Regex>,
    escalation: Vec<Regex>,
    overconfident: Vec<Regex>,
    uncertain: Regex,
    whitespace: Regex,
}

impl Guard {
    pub fn new(policy: &Policy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            max_message_length: policy.input.max_message_length,
            blocked: compile_all(&policy.input.blocked_patterns, false)?,
            escalation: compile_all(&policy.escalation.triggers, true)?,
            overconfident: compile_all(
                &[
                    r"I'm (absolutely |100% )?certain that",
                    r"I guarantee",
                    r"This will definitely",
                ],
                true,
            )?,
            uncertain: compile(r"I don't know|I'm not sure|I cannot", true)?,
            whitespace: compile(r"\s+", false)?,
        })
    }

    /// Validate a user message and collapse its whitespace.
    pub fn check_input(&self, message: &str) -> Decision {
        if message.trim().is_empty() {
            return deny("Message is required");
        }

        if message.chars().count() > self.max_message_length {
            return deny(format!(
                "Message too long. Maximum {} characters allowed.",
                self.max_message_length
            ));
        }

        if self.blocked.iter().any(|p| p.is_match(message)) {
            return deny("Message contains invalid content");
        }

        let sanitized = self.whitespace.replace_all(message.trim(), " ").into_owned();
        Decision::Allow { sanitized }
    }

    /// Soften overconfident claims and add a help footer to thin answers.
    pub fn review_output(&self, reply: &str) -> String {
        if reply.is_empty() {
            return EMPTY_REPLY.to_string();
        }

        let mut reviewed = reply.to_string();
        for phrase in &self.overconfident {
            reviewed = phrase
                .replace_all(&reviewed, "Based on available information,")
                .into_owned();
        }

        if reviewed.chars().count() < SHORT_REPLY_CHARS || self.uncertain.is_match(&reviewed) {
            reviewed.push_str(HELP_FOOTER);
        }
        reviewed
    }

    /// Whether the user's question is one a human planner should handle.
    pub fn needs_expert(&self, user_message: &str) -> bool {
        self.escalation.iter().any(|p| p.is_match(user_message))
    }

    /// Append the expert-guidance offer when the question calls for it.
    pub fn with_expert_hint(&self, reply: String, user_message: &str) -> String {
        if self.needs_expert(user_message) {
            reply + EXPERT_HINT
        } else {
            reply
        }
    }
}

fn deny(reason: impl Into<String>) -> Decision {
    Decision::Deny {
        reason: reason.into(),
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn compile_all<S: AsRef<str>>(patterns: &[S], case_insensitive: bool) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| compile(p.as_ref(), case_insensitive))
        .collect()
}
