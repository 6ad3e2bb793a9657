//! Configuration loading from concierge.toml.

use policy::Policy;
use runtime::ModelCandidate;
use runtime::ModelRoster;
use runtime::providers::GEMINI_API_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "concierge.toml";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "CONCIERGE_CONFIG";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Longest accepted `backend.exchange_timeout_secs` (one hour).
const MAX_EXCHANGE_TIMEOUT_SECS: u64 = 60 * 60;

/// Longest accepted `session.ttl_hours` (one year).
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Key value shipped in sample env files; treated as unset.
const PLACEHOLDER_KEY: &str = "your_gemini_api_key_here";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Input rules, daily limits and escalation triggers.
    #[serde(flatten)]
    pub policy: Policy,
}

/// Model provider configuration.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Gemini API key. `GEMINI_API_KEY` takes precedence.
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Candidate models, best first. Empty means the built-in roster.
    #[serde(default)]
    pub models: Vec<ModelCandidate>,

    /// Provider round-trips allowed per attempt.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Wall-clock budget for one exchange, failovers included.
    #[serde(default = "default_exchange_timeout_secs")]
    pub exchange_timeout_secs: u64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            models: Vec::new(),
            max_rounds: default_max_rounds(),
            exchange_timeout_secs: default_exchange_timeout_secs(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Prior turns sent with each message.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Idle hours before a session is dropped.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            ttl_hours: default_ttl_hours(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Catalog JSON document; the bundled catalog when unset.
    pub path: Option<PathBuf>,
}

fn default_base_url() -> String {
    GEMINI_API_URL.to_string()
}

fn default_max_rounds() -> u32 {
    runtime::DEFAULT_MAX_ROUNDS
}

fn default_exchange_timeout_secs() -> u64 {
    runtime::DEFAULT_EXCHANGE_TIMEOUT.as_secs()
}

fn default_max_output_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

fn default_history_window() -> usize {
    runtime::DEFAULT_HISTORY_WINDOW
}

fn default_ttl_hours() -> i64 {
    storage::DEFAULT_SESSION_TTL_HOURS
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `$CONCIERGE_CONFIG`, else `./concierge.toml` if present, else defaults;
    /// then the API key from `$GEMINI_API_KEY` if set.
    pub fn discover() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(CONFIG_FILE)).filter(|p| p.exists()));
        let config = match &path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        Ok((config.with_env_key(std::env::var(API_KEY_ENV).ok()), path))
    }

    /// Prefer `key` over the file's key when it is set.
    pub fn with_env_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.backend.api_key = Some(key);
        }
        self
    }

    /// The usable API key, if any. Blank and placeholder keys count as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.backend
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_KEY)
    }

    /// Configured candidates, or the built-in Gemini roster.
    pub fn roster(&self) -> ModelRoster {
        ModelRoster::new(self.backend.models.clone()).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session.ttl_hours) {
            return Err(ConfigError::Invalid(format!(
                "session.ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}"
            )));
        }
        if !(1..=MAX_EXCHANGE_TIMEOUT_SECS).contains(&self.backend.exchange_timeout_secs) {
            return Err(ConfigError::Invalid(format!(
                "backend.exchange_timeout_secs must be between 1 and {MAX_EXCHANGE_TIMEOUT_SECS}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Policy(#[from] policy::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::{DailyLimit, ModelTier};

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.backend.base_url, GEMINI_API_URL);
        assert_eq!(config.backend.max_rounds, 10);
        assert_eq!(config.backend.exchange_timeout_secs, 60);
        assert_eq!(config.session.history_window, 10);
        assert_eq!(config.policy.input.max_message_length, 2000);
        assert_eq!(config.roster().len(), 6);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn full_file() {
        let config = Config::parse(
            r#"
            [backend]
            api_key = "AIza-test"
            max_rounds = 4
            temperature = 0.2

            [[backend.models]]
            identifier = "gemini-2.0-flash"
            tier = "flash"
            daily_limit = "unlimited"

            [[backend.models]]
            identifier = "gemini-2.5-flash"
            tier = "flash"
            daily_limit = { requests = 20 }
            status = "degraded"

            [session]
            history_window = 6

            [input]
            max_message_length = 500

            [limits]
            guest = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key(), Some("AIza-test"));
        assert_eq!(config.backend.max_rounds, 4);
        assert_eq!(config.session.history_window, 6);
        assert_eq!(config.session.ttl_hours, 24);
        assert_eq!(config.policy.input.max_message_length, 500);
        assert_eq!(config.policy.limits.guest, 3);
        assert_eq!(config.policy.limits.free, 10);

        let roster = config.roster();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.candidates()[0].tier, ModelTier::Flash);
        assert_eq!(roster.candidates()[1].daily_limit, DailyLimit::Requests(20));
    }

    #[test]
    fn placeholder_key_is_unset() {
        let config = Config::default().with_env_key(Some(PLACEHOLDER_KEY.to_string()));
        assert!(config.api_key().is_none());
    }

    #[test]
    fn env_key_overrides_file() {
        let config = Config::parse("[backend]\napi_key = \"from-file\"")
            .unwrap()
            .with_env_key(Some("from-env".to_string()));
        assert_eq!(config.api_key(), Some("from-env"));

        let config = Config::parse("[backend]\napi_key = \"from-file\"")
            .unwrap()
            .with_env_key(Some("  ".to_string()));
        assert_eq!(config.api_key(), Some("from-file"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            Config::parse("[session]\nttl_hours = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse("[session]\nttl_hours = 9223372036854775807"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse("[backend]\nexchange_timeout_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse("[backend]\nexchange_timeout_secs = 18446744073709"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(Config::parse("[backend]\nexchange_timeout_secs = 3600").is_ok());
        assert!(matches!(
            Config::parse("[input]\nmax_message_length = 0"),
            Err(ConfigError::Policy(_))
        ));
        assert!(matches!(
            Config::parse("[backend]\nmax_rounds = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
