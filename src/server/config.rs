//! Server configuration types

use anyhow::{bail, Result};
use parley_channels::util::DISCORD_MESSAGE_LIMIT;
use parley_core::{RouterConfig, IDENTITY_FILE};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub discord: DiscordSettings,
    pub llm: LlmConfig,
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub identity_file: Option<String>,
    pub session: SessionConfig,
    pub reply: ReplyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Discord connection settings
#[derive(Clone, Deserialize)]
pub struct DiscordSettings {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl std::fmt::Debug for DiscordSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordSettings")
            .field("token", &"[REDACTED]")
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// LLM configuration
#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// Session cache and persistence settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub max_messages: usize,
    pub expiry_secs: u64,
    pub sweep_interval_secs: u64,
}

/// Reply formatting settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyConfig {
    pub limit: usize,
    pub empty_placeholder: String,
    pub error_notice: String,
}

/// Logging settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_iterations() -> usize {
    10
}

/// `~/.config/parley`, or `./parley-data` when no home directory is known
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("parley"))
        .unwrap_or_else(|| PathBuf::from("parley-data"))
}

impl AppConfig {
    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir)
    }

    /// Resolved system prompt file
    pub fn identity_path(&self) -> PathBuf {
        self.identity_file
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.data_dir().join(IDENTITY_FILE))
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    /// Reject settings the bot cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.trim().is_empty() {
            bail!("Discord bot token is required (--token or DISCORD_BOT_TOKEN)");
        }
        if self.discord.prefix.is_empty() {
            bail!("discord.prefix must not be empty");
        }
        if self.llm.max_iterations == 0 {
            bail!("llm.max_iterations must be at least 1");
        }
        if self.session.max_messages == 0 {
            bail!("session.max_messages must be at least 1");
        }
        if self.session.sweep_interval_secs == 0 {
            bail!("session.sweep_interval_secs must be at least 1");
        }
        if self.reply.limit == 0 {
            bail!("reply.limit must be at least 1");
        }
        if self.reply.limit > DISCORD_MESSAGE_LIMIT {
            bail!("reply.limit must not exceed {DISCORD_MESSAGE_LIMIT}, Discord rejects longer messages");
        }
        Ok(())
    }

    /// Router settings for the given system prompt
    pub fn router_config(&self, system_prompt: String) -> RouterConfig {
        RouterConfig {
            prefix: self.discord.prefix.clone(),
            system_prompt,
            reply_limit: self.reply.limit,
            empty_placeholder: self.reply.empty_placeholder.clone(),
            error_notice: self.reply.error_notice.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::loader::config_from_sources;

    fn base() -> AppConfig {
        let mut config = config_from_sources(None).unwrap();
        config.discord.token = "token".to_string();
        config
    }

    #[test]
    fn test_validate_ok() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut config = base();
        config.discord.token = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let mut config = base();
        config.discord.prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_reply_limit_above_discord_cap() {
        let mut config = base();
        config.reply.limit = DISCORD_MESSAGE_LIMIT;
        assert!(config.validate().is_ok());

        config.reply.limit = DISCORD_MESSAGE_LIMIT + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reply.limit"));
    }

    #[test]
    fn test_identity_defaults_into_data_dir() {
        let mut config = base();
        config.data_dir = Some("/srv/parley".to_string());
        assert_eq!(config.identity_path(), PathBuf::from("/srv/parley/IDENTITY.md"));

        config.identity_file = Some("/etc/prompt.md".to_string());
        assert_eq!(config.identity_path(), PathBuf::from("/etc/prompt.md"));
    }

    #[test]
    fn test_debug_masks_secrets() {
        let mut config = base();
        config.discord.token = "super-secret-token".to_string();
        config.llm.api_key = Some("sk-live-123".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(!debug.contains("sk-live-123"));
    }

    #[test]
    fn test_router_config() {
        let router = base().router_config("prompt".to_string());
        assert_eq!(router.prefix, "!");
        assert_eq!(router.reply_limit, 2000);
        assert_eq!(router.system_prompt, "prompt");
    }
}
