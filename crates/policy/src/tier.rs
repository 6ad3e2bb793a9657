//! Account tiers.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The account tier of the person chatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Not signed in.
    #[default]
    Guest,
    Free,
    Premium,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Guest => "guest",
            Tier::Free => "free",
            Tier::Premium => "premium",
        }
    }

    /// What to tell someone who has used up today's messages.
    pub fn limit_message(self) -> &'static str {
        match self {
            Tier::Guest => {
                "You've used all your free messages for today. Sign up for free to get 10 messages/day, or upgrade to Premium for unlimited access!"
            }
            Tier::Free | Tier::Premium => {
                "You've reached your daily message limit. Upgrade to Premium for unlimited access!"
            }
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guest" => Ok(Tier::Guest),
            "free" => Ok(Tier::Free),
            "premium" => Ok(Tier::Premium),
            other => Err(Error::Invalid(format!("unknown tier: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Premium".parse::<Tier>().unwrap(), Tier::Premium);
        assert_eq!(" guest ".parse::<Tier>().unwrap(), Tier::Guest);
        assert!("gold".parse::<Tier>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Tier::Free).unwrap(), "\"free\"");
    }
}
