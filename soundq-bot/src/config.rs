//! soundq-bot specific configuration
//!
//! Runtime settings the command needs, derived once from the bootstrap
//! `TomlConfig` plus command-line overrides.

use crate::policy::DurationPolicy;
use soundq_common::config::{EmojiConfig, TomlConfig};

/// Sound command settings
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// Command prefix shown in help text
    pub prefix: String,
    /// Prepended to the identifier for the search retry
    pub search_prefix: String,
    pub policy: DurationPolicy,
    /// Resolve arguments with no local match as backend queries
    pub allow_remote_queries: bool,
    pub emojis: EmojiConfig,
}

impl BotSettings {
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            search_prefix: config.search_prefix.clone(),
            policy: DurationPolicy::new(config.max_duration_ms()),
            allow_remote_queries: config.allow_remote_queries,
            emojis: config.emojis.clone(),
        }
    }

    /// Override the maximum track length (seconds, 0 = no limit)
    pub fn with_max_seconds(mut self, max_seconds: u64) -> Self {
        self.policy = match max_seconds {
            0 => DurationPolicy::unlimited(),
            secs => DurationPolicy::new(Some(secs.saturating_mul(1000))),
        };
        self
    }

    pub fn with_remote_queries(mut self, allow: bool) -> Self {
        self.allow_remote_queries = allow;
        self
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self::from_toml(&TomlConfig::default())
    }
}
