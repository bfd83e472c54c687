//! Wikisage configuration system.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, WikisageError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WikisageConfig {
    #[serde(default)]
    pub wiki: WikiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl WikisageConfig {
    /// Load config from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WikisageError::Config(format!("failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| WikisageError::Config(format!("failed to parse config: {e}")))?;
        Ok(config)
    }
}

/// Wiki source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    #[serde(default = "default_wiki_url")]
    pub url: String,
}

fn default_wiki_url() -> String {
    "https://wiki.example.com/".into()
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self { url: default_wiki_url() }
    }
}

/// Model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_top_p() -> f32 {
    1.0
}
fn default_api_base() -> String {
    "https://api.openai.com/v1".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            api_base: default_api_base(),
            embedding_model: default_embedding_model(),
        }
    }
}

/// Prompt file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_instruction_file")]
    pub instruction_file: String,
    #[serde(default = "default_context_file")]
    pub context_file: String,
}

fn default_instruction_file() -> String {
    "instruction_prompt.txt".into()
}
fn default_context_file() -> String {
    "context_prompt.txt".into()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            instruction_file: default_instruction_file(),
            context_file: default_context_file(),
        }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of sections returned per query.
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    7
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { k: default_k() }
    }
}

/// How inbound events map to conversation sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionScope {
    /// Every user shares one conversation history.
    Shared,
    /// Each author id gets its own history.
    PerUser,
}

/// Conversation history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Root directory holding one history file per session.
    #[serde(default = "default_memory_dir")]
    pub dir: String,
    #[serde(default = "default_session_scope")]
    pub session_scope: SessionScope,
}

fn default_memory_dir() -> String {
    "memories".into()
}
fn default_session_scope() -> SessionScope {
    SessionScope::Shared
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            dir: default_memory_dir(),
            session_scope: default_session_scope(),
        }
    }
}

/// Telegram channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Seconds between long-poll cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

fn default_poll_interval() -> u64 {
    1
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self { poll_interval: default_poll_interval() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WikisageConfig::default();
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert!((config.model.temperature - 0.0).abs() < 0.001);
        assert_eq!(config.retrieval.k, 7);
        assert_eq!(config.memory.dir, "memories");
        assert_eq!(config.memory.session_scope, SessionScope::Shared);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [wiki]
            url = "https://wiki.test.example/"

            [model]
            name = "gpt-4o"
            temperature = 0.3

            [memory]
            session_scope = "peruser"
        "#;

        let config: WikisageConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.wiki.url, "https://wiki.test.example/");
        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.memory.session_scope, SessionScope::PerUser);
        // Untouched sections keep their defaults
        assert_eq!(config.retrieval.k, 7);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: WikisageConfig = toml::from_str("").unwrap();
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.prompts.instruction_file, "instruction_prompt.txt");
        assert_eq!(config.telegram.poll_interval, 1);
    }
}
