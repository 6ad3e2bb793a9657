//! Policy configuration.

use crate::{Error, Result, Tier};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Policy configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Policy {
    /// Rules applied to incoming user messages.
    #[serde(default)]
    pub input: InputRules,

    /// Daily message limits per tier.
    #[serde(default)]
    pub limits: UsageLimits,

    /// Questions that should be offered a human expert.
    #[serde(default)]
    pub escalation: EscalationRules,
}

/// Rules for incoming messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputRules {
    /// Maximum message length in characters.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Regular expressions that reject a message outright.
    #[serde(default = "default_blocked_patterns")]
    pub blocked_patterns: Vec<String>,
}

impl Default for InputRules {
    fn default() -> Self {
        Self {
            max_message_length: default_max_message_length(),
            blocked_patterns: default_blocked_patterns(),
        }
    }
}

/// Messages allowed per identifier per UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLimits {
    #[serde(default = "default_guest_limit")]
    pub guest: u32,
    #[serde(default = "default_free_limit")]
    pub free: u32,
    #[serde(default = "default_premium_limit")]
    pub premium: u32,
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self {
            guest: default_guest_limit(),
            free: default_free_limit(),
            premium: default_premium_limit(),
        }
    }
}

impl UsageLimits {
    pub fn for_tier(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Guest => self.guest,
            Tier::Free => self.free,
            Tier::Premium => self.premium,
        }
    }
}

/// Triggers for the expert-guidance suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRules {
    /// Case-insensitive regular expressions matched against the user message.
    #[serde(default = "default_escalation_triggers")]
    pub triggers: Vec<String>,
}

impl Default for EscalationRules {
    fn default() -> Self {
        Self {
            triggers: default_escalation_triggers(),
        }
    }
}

/// Result of an input check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The message may proceed, in its sanitised form.
    Allow { sanitized: String },
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }
}

impl Policy {
    /// Load policy from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse policy from TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        let policy: Self = toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check values that parse but make no sense.
    pub fn validate(&self) -> Result<()> {
        if self.input.max_message_length == 0 {
            return Err(Error::Invalid(
                "input.max_message_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_max_message_length() -> usize {
    2000
}

fn default_blocked_patterns() -> Vec<String> {
    vec![
        r"(?i)\b(hack|exploit|sql\s*inject|script\s*inject)\b".to_string(),
        r"(?i)<script[\s\S]*?>".to_string(),
        // Template injection
        r"\{\{[\s\S]*?\}\}".to_string(),
    ]
}

fn default_guest_limit() -> u32 {
    5
}

fn default_free_limit() -> u32 {
    10
}

fn default_premium_limit() -> u32 {
    1000
}

fn default_escalation_triggers() -> Vec<String> {
    vec![
        r"legal|contract|refund|dispute".to_string(),
        r"custom.*design|bespoke|unique.*creation".to_string(),
        r"budget.*crore|very\s+high.*budget".to_string(),
        r"celebrity|vip|destination.*abroad".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = Policy::default();
        assert_eq!(policy.input.max_message_length, 2000);
        assert_eq!(policy.input.blocked_patterns.len(), 3);
        assert_eq!(policy.limits.for_tier(Tier::Guest), 5);
        assert_eq!(policy.limits.for_tier(Tier::Free), 10);
        assert_eq!(policy.limits.for_tier(Tier::Premium), 1000);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[input]
max_message_length = 500

[limits]
guest = 2
"#;
        let policy = Policy::parse(toml).unwrap();
        assert_eq!(policy.input.max_message_length, 500);
        // Unset keys keep their defaults.
        assert_eq!(policy.input.blocked_patterns.len(), 3);
        assert_eq!(policy.limits.guest, 2);
        assert_eq!(policy.limits.free, 10);
        assert_eq!(policy.escalation.triggers.len(), 4);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let policy = Policy::parse("").unwrap();
        assert_eq!(policy.limits, UsageLimits::default());
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = Policy::parse("[input]\nmax_message_length = 0\n").unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            Policy::parse("[limits]\nguest = \"many\""),
            Err(Error::Parse(_))
        ));
    }
}
