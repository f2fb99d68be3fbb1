use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KizunaConfig {
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub moderation: ModerationConfig,
    pub cache: CacheConfig,
    pub dialogue: DialogueConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

/// Connection settings for the OpenAI-compatible moderation and chat endpoints.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RemoteConfig {
    /// Empty disables both remote moderation layers and the chat model.
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub moderation_model: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModerationConfig {
    pub remote_classifier: bool,
    pub semantic_check: bool,
    /// Texts at or below this many characters skip the semantic layer.
    pub semantic_min_chars: usize,
    pub extra_keywords: Vec<String>,
    pub extra_patterns: Vec<String>,
    /// TOML file with a top-level `patterns = [...]` array, appended to the defaults.
    pub patterns_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_ms: u64,
    pub sweep_interval_ms: u64,
    pub capacity: usize,
    pub truncate_chars: usize,
    pub history_window: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DialogueConfig {
    pub fallback_line: String,
}

impl Default for KizunaConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            remote: RemoteConfig::default(),
            moderation: ModerationConfig::default(),
            cache: CacheConfig::default(),
            dialogue: DialogueConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 8730,
            log_level: "info".into(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
            chat_model: "gpt-4o-mini".into(),
            moderation_model: "omni-moderation-latest".into(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            remote_classifier: true,
            semantic_check: true,
            semantic_min_chars: 20,
            extra_keywords: Vec::new(),
            extra_patterns: Vec::new(),
            patterns_file: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 5_000,
            sweep_interval_ms: 30_000,
            capacity: 50,
            truncate_chars: 50,
            history_window: 3,
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            fallback_line: "Hello!".into(),
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

/// Returns `~/.kizuna/`
pub fn default_kizuna_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kizuna")
}

/// Returns the default config file path: `~/.kizuna/config.toml`
pub fn default_config_path() -> PathBuf {
    default_kizuna_dir().join("config.toml")
}

impl KizunaConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            KizunaConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// `KIZUNA_API_KEY` wins over `OPENAI_API_KEY`; the latter is only read when
    /// neither the file nor `KIZUNA_API_KEY` supplied a key.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("KIZUNA_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("KIZUNA_API_KEY") {
            self.remote.api_key = val;
        } else if self.remote.api_key.is_empty() {
            if let Ok(val) = std::env::var("OPENAI_API_KEY") {
                self.remote.api_key = val;
            }
        }
        if let Ok(val) = std::env::var("KIZUNA_BASE_URL") {
            self.remote.base_url = val;
        }
        if let Ok(val) = std::env::var("KIZUNA_CHAT_MODEL") {
            self.remote.chat_model = val;
        }
    }

    /// Resolve the optional pattern file path, expanding `~` if needed.
    pub fn resolved_patterns_path(&self) -> Option<PathBuf> {
        self.moderation.patterns_file.as_deref().map(expand_tilde)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = KizunaConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.cache.ttl_ms, 5_000);
        assert_eq!(config.cache.sweep_interval_ms, 30_000);
        assert_eq!(config.cache.capacity, 50);
        assert_eq!(config.moderation.semantic_min_chars, 20);
        assert_eq!(config.dialogue.fallback_line, "Hello!");
        assert!(!config.remote.is_configured());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[remote]
api_key = "sk-test"
chat_model = "gpt-4.1-mini"

[moderation]
extra_patterns = ["(?i)pretend to be"]

[cache]
capacity = 10
"#;
        let config: KizunaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.remote.api_key, "sk-test");
        assert_eq!(config.remote.chat_model, "gpt-4.1-mini");
        assert_eq!(config.moderation.extra_patterns.len(), 1);
        assert_eq!(config.cache.capacity, 10);
        // defaults still apply for unset fields
        assert_eq!(config.cache.ttl_ms, 5_000);
        assert_eq!(config.remote.base_url, "https://api.openai.com/v1");
        assert!(config.remote.is_configured());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = KizunaConfig::default();
        std::env::set_var("KIZUNA_LOG_LEVEL", "trace");
        std::env::set_var("KIZUNA_API_KEY", "sk-env");
        std::env::set_var("KIZUNA_CHAT_MODEL", "local-model");

        config.apply_env_overrides();

        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.remote.api_key, "sk-env");
        assert_eq!(config.remote.chat_model, "local-model");

        // Clean up
        std::env::remove_var("KIZUNA_LOG_LEVEL");
        std::env::remove_var("KIZUNA_API_KEY");
        std::env::remove_var("KIZUNA_CHAT_MODEL");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = KizunaConfig::load_from(tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.cache.capacity, 50);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[cache\ncapacity = ").unwrap();
        assert!(KizunaConfig::load_from(&path).is_err());
    }
}
