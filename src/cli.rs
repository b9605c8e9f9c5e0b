//! Command-line interface

use crate::server::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// Discord chat bot with durable per-user sessions and memory
#[derive(Parser, Debug, Default)]
#[command(name = "parley")]
#[command(version)]
pub struct Cli {
    /// Discord bot token
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Provider/model (e.g. openai/gpt-4.1-nano)
    #[arg(long, env = "PARLEY_MODEL")]
    pub model: Option<String>,

    /// API key overriding the provider's environment variable
    #[arg(long)]
    pub key: Option<String>,

    /// Command prefix for guild channels
    #[arg(long)]
    pub prefix: Option<String>,

    /// Path to the system prompt file (default: <data>/IDENTITY.md)
    #[arg(long)]
    pub identity: Option<PathBuf>,

    /// Data directory for sessions and memory (default: ~/.config/parley)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Apply flags on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            config.discord.token = token.clone();
        }
        if let Some(model) = self.model.as_ref().filter(|m| !m.is_empty()) {
            config.llm.model = model.clone();
        }
        if let Some(key) = self.key.as_ref().filter(|k| !k.is_empty()) {
            config.llm.api_key = Some(key.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.discord.prefix = prefix.clone();
        }
        if let Some(identity) = &self.identity {
            config.identity_file = Some(identity.display().to_string());
        }
        if let Some(data) = &self.data {
            config.data_dir = Some(data.display().to_string());
        }
        if self.log_json {
            config.logging.json = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::loader::config_from_sources;

    #[test]
    fn test_flags_override_config() {
        let mut config = config_from_sources(None).unwrap();
        let cli = Cli::parse_from([
            "parley",
            "--token",
            "abc",
            "--model",
            "groq/llama-3.3-70b-versatile",
            "--prefix",
            "?",
            "--data",
            "/tmp/parley-test",
            "--log-json",
        ]);
        cli.apply(&mut config);

        assert_eq!(config.discord.token, "abc");
        assert_eq!(config.llm.model, "groq/llama-3.3-70b-versatile");
        assert_eq!(config.discord.prefix, "?");
        assert_eq!(config.data_dir.as_deref(), Some("/tmp/parley-test"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = config_from_sources(None).unwrap();
        Cli::default().apply(&mut config);
        assert_eq!(config.discord.prefix, "!");
        assert_eq!(config.llm.model, "openai/gpt-4.1-nano");
        assert!(config.llm.api_key.is_none());
    }
}
