use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub readers: ReadersConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadersConfig {
    /// Idle window between two photos of the same album.
    #[serde(default = "default_media_group_wait_ms")]
    pub media_group_wait_ms: u64,
}

fn default_media_group_wait_ms() -> u64 {
    2000
}

impl ReadersConfig {
    pub fn media_group_wait(&self) -> Duration {
        Duration::from_millis(self.media_group_wait_ms)
    }
}

impl Default for ReadersConfig {
    fn default() -> Self {
        Self {
            media_group_wait_ms: default_media_group_wait_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    #[serde(default = "default_exit_button_text")]
    pub exit_button_text: String,
    #[serde(default = "default_exit_commands")]
    pub exit_commands: Vec<String>,
    /// Overall wait for an answer to a prompt. `None` waits forever.
    #[serde(default)]
    pub reply_timeout_secs: Option<u64>,
    #[serde(default = "default_update_buffer")]
    pub update_buffer: usize,
}

fn default_exit_button_text() -> String {
    "Cancel".to_string()
}

fn default_exit_commands() -> Vec<String> {
    vec!["/cancel".to_string()]
}

fn default_update_buffer() -> usize {
    32
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            exit_button_text: default_exit_button_text(),
            exit_commands: default_exit_commands(),
            reply_timeout_secs: None,
            update_buffer: default_update_buffer(),
        }
    }
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    pub bot_token: Option<String>,
    #[serde(default)]
    pub allowed_users: Vec<i64>,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u32,
}

fn default_poll_timeout() -> u32 {
    30
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReaderError::Config(format!("Failed to read config: {e}")))?;
        let content = substitute_env_vars(&content);
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pawprint")
            .join("config.toml")
    }

    pub fn default_toml() -> &'static str {
        r#"[readers]
media_group_wait_ms = 2000

[conversation]
exit_button_text = "Cancel"
exit_commands = ["/cancel"]
update_buffer = 32
# reply_timeout_secs = 600

[channels.telegram]
enabled = true
bot_token = "${TELEGRAM_BOT_TOKEN}"
allowed_users = []
poll_timeout_secs = 30
"#
    }
}

/// Substitute `${VAR_NAME}` patterns with environment variable values.
pub fn substitute_env_vars(input: &str) -> String {
    let re = match Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}") {
        Ok(re) => re,
        Err(_) => return input.to_string(),
    };
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(Config::default_toml()).unwrap();
        assert_eq!(config.readers.media_group_wait_ms, 2000);
        assert_eq!(config.conversation.exit_commands, vec!["/cancel"]);
        let telegram = config.channels.telegram.unwrap();
        assert!(telegram.enabled);
        assert_eq!(telegram.poll_timeout_secs, 30);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.readers.media_group_wait(), Duration::from_secs(2));
        assert_eq!(config.conversation.exit_button_text, "Cancel");
        assert!(config.conversation.reply_timeout_secs.is_none());
        assert!(config.channels.telegram.is_none());
    }

    #[test]
    fn test_short_media_group_window() {
        let config: Config = toml::from_str("[readers]\nmedia_group_wait_ms = 150\n").unwrap();
        assert_eq!(config.readers.media_group_wait(), Duration::from_millis(150));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PAWPRINT_TEST_VAR", "hello123");
        let result = substitute_env_vars("key = \"${PAWPRINT_TEST_VAR}\"");
        assert_eq!(result, "key = \"hello123\"");
        std::env::remove_var("PAWPRINT_TEST_VAR");
    }

    #[test]
    fn test_missing_env_var_becomes_empty() {
        let result = substitute_env_vars("key = \"${NONEXISTENT_VAR_XYZ}\"");
        assert_eq!(result, "key = \"\"");
    }

    #[test]
    fn test_load_from_file() {
        std::env::set_var("PAWPRINT_TEST_TOKEN", "123:abc");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[channels.telegram]").unwrap();
        writeln!(file, "enabled = true").unwrap();
        writeln!(file, "bot_token = \"${{PAWPRINT_TEST_TOKEN}}\"").unwrap();
        writeln!(file, "allowed_users = [42]").unwrap();

        let config = Config::load(file.path()).unwrap();
        let telegram = config.channels.telegram.unwrap();
        assert_eq!(telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(telegram.allowed_users, vec![42]);
        std::env::remove_var("PAWPRINT_TEST_TOKEN");
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = Config::load(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ReaderError::Config(_)));
    }
}
